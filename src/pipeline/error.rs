//! Error types for the embedding pipeline

use crate::Error as CrateError;
use thiserror::Error;

use super::embedder::EmbedError;
use super::store::StoreError;

/// Error type for pipeline operations
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input validation failure, never retried
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A non-retryable embedding failure
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbedError),

    /// A retryable embedding failure that exhausted its retry budget
    #[error("Embedding failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: EmbedError,
    },

    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Rate limiter shut down while waiting for a slot
    #[error("Rate limiter error: {0}")]
    Limiter(String),
}

impl From<PipelineError> for CrateError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(msg) => CrateError::InvalidRequest(msg),
            PipelineError::Storage(e) => CrateError::Storage(e.to_string()),
            PipelineError::Embedding(_) | PipelineError::RetriesExhausted { .. } => {
                CrateError::Embedding(err.to_string())
            }
            PipelineError::Limiter(msg) => CrateError::Pipeline(msg),
        }
    }
}
