//! Error types for the sitesift crate

use thiserror::Error;

/// Result type for sitesift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sitesift operations
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Page fetch error
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Chunking/embedding pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Embedding generation error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
