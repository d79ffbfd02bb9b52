use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between issuing a page request and holding
/// a parsed document. All of these end pagination for the current locality.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: StatusCode, url: String },
    #[error("Empty response body from {0}")]
    EmptyBody(String),
    #[error("Invalid selector `{css}`: {reason}")]
    Selector { css: String, reason: String },
}
