// src/domain/sale.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A sale as it is persisted: typed, with `None` wherever the listing gave
/// nothing usable. Serializes to the destination table's column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    #[serde(rename = "suburb")]
    pub locality: String,
    pub address: String,
    pub price: Option<f64>,
    pub sold_date: Option<NaiveDate>,
    pub property_type: Option<String>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub parking: Option<i64>,
    pub land_size: Option<f64>,
    pub collected_at: NaiveDateTime,
}

impl SaleRecord {
    /// The conflict key, when the record has one. Without a sale date the
    /// record is always written as a fresh row.
    pub fn natural_key(&self) -> Option<(&str, NaiveDate)> {
        self.sold_date.map(|d| (self.address.as_str(), d))
    }
}
