use crate::db::connection::Database;
use crate::domain::SaleRecord;
use crate::store::{SaleStore, StoreError};
use rusqlite::params;

const UPSERT_SALE: &str = r#"
    INSERT INTO nsw_property_sales (
        suburb, address, price, sold_date, property_type,
        bedrooms, bathrooms, parking, land_size, collected_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT(address, sold_date) DO UPDATE SET
        suburb = excluded.suburb,
        price = excluded.price,
        property_type = excluded.property_type,
        bedrooms = excluded.bedrooms,
        bathrooms = excluded.bathrooms,
        parking = excluded.parking,
        land_size = excluded.land_size,
        collected_at = excluded.collected_at
"#;

/// Local SQLite destination. Each batch is one transaction, so a failing
/// batch leaves nothing behind.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl SaleStore for SqliteStore {
    fn upsert(&self, rows: &[SaleRecord]) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(UPSERT_SALE)?;
                for row in rows {
                    stmt.execute(params![
                        row.locality,
                        row.address,
                        row.price,
                        row.sold_date,
                        row.property_type,
                        row.bedrooms,
                        row.bathrooms,
                        row.parking,
                        row.land_size,
                        row.collected_at,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }
}

/// One stored row, as read back for inspection.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSale {
    pub suburb: String,
    pub address: String,
    pub price: Option<f64>,
    pub sold_date: Option<String>,
    pub bedrooms: Option<i64>,
    pub land_size: Option<f64>,
}

pub fn count_sales(db: &Database) -> Result<i64, StoreError> {
    db.with_conn(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM nsw_property_sales", [], |row| row.get(0))?)
    })
}

#[cfg(test)]
pub fn sales_for_suburb(db: &Database, suburb: &str) -> Result<Vec<StoredSale>, StoreError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT suburb, address, price, sold_date, bedrooms, land_size
            FROM nsw_property_sales
            WHERE suburb = ?1
            ORDER BY address, sold_date
            "#,
        )?;

        let rows = stmt.query_map(params![suburb], |row| {
            Ok(StoredSale {
                suburb: row.get(0)?,
                address: row.get(1)?,
                price: row.get(2)?,
                sold_date: row.get(3)?,
                bedrooms: row.get(4)?,
                land_size: row.get(5)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}
