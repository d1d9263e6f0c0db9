//! Error types for the crawler module

use crate::Error as CrateError;
use thiserror::Error;

/// Error type for crawler operations.
///
/// Per-page fetch and parse failures are not represented here: they are
/// logged, counted in [`super::CrawlStats`], and skipped so a single bad
/// page never aborts a crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The start URL could not be parsed
    #[error("Invalid start URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The start URL has no usable host or scheme
    #[error("Unsupported start URL: {0}")]
    UnsupportedUrl(String),

    /// Configuration validation failure
    #[error("Invalid crawler configuration: {0}")]
    Config(String),
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Config(msg) => CrateError::InvalidRequest(msg),
            CrawlError::InvalidUrl { .. } | CrawlError::UnsupportedUrl(_) => {
                CrateError::InvalidRequest(err.to_string())
            }
        }
    }
}
