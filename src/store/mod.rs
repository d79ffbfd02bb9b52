pub mod batcher;
pub mod rest;

use crate::domain::SaleRecord;
use reqwest::StatusCode;
use thiserror::Error;

pub use batcher::{upload, UploadSummary, DEFAULT_BATCH_SIZE};
pub use rest::RestStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store rejected batch: HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("store request failed: {0}")]
    Transport(String),
    #[error("Database Error: {0}")]
    Db(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Db(e.to_string())
    }
}

/// Destination for normalized sales. `upsert` must be idempotent on
/// (address, sold_date): a matching row is overwritten, anything else inserted.
pub trait SaleStore {
    fn upsert(&self, rows: &[SaleRecord]) -> Result<(), StoreError>;
}
