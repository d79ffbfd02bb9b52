pub mod normalize;
pub mod sale;

pub use normalize::normalize_batch;
pub use sale::SaleRecord;
