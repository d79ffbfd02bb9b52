// errors.rs
use thiserror::Error;

/// Startup failures: bad configuration, unreadable feed, unusable database.
/// Once the per-locality loop starts nothing is fatal.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Feed error: {0}")]
    Feed(String),
    #[error("Database Error: {0}")]
    Db(String),
}
