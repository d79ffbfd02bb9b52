pub mod extract;
pub mod fetcher;
pub mod models;
pub mod pacing;
pub mod pager;
mod scraper_error;
pub mod urls;

pub use fetcher::{HttpPageSource, PageFetcher, PageSource};
pub use models::RawSale;
pub use pacing::Pacing;
pub use pager::Paginator;
pub use scraper_error::ScraperError;
