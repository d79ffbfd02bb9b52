pub mod connection;
pub mod sales;

pub use connection::{init_db, Database};
pub use sales::SqliteStore;
