//! Embedding capability seam.
//!
//! The pipeline never talks to an embedding service directly: it calls
//! whatever [`EmbedText`] implementation it was constructed with. Failure
//! kinds are part of the contract so the retry policy can distinguish
//! transient faults (rate limits, server errors, timeouts, connection
//! resets) from terminal ones (invalid input, auth).

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovernorLimiter};
use thiserror::Error;
use tracing::{Instrument, debug_span};

/// Error type for embedding calls, split by retryability
#[derive(Debug, Clone, Error)]
pub enum EmbedError {
    /// Provider rate limit hit; retryable
    #[error("rate limited by the embedding service")]
    RateLimited,

    /// Provider-side failure (5xx class); retryable
    #[error("embedding service error: {0}")]
    Server(String),

    /// Request timed out; retryable
    #[error("embedding request timed out")]
    Timeout,

    /// Connection dropped mid-request; retryable
    #[error("connection reset during embedding request")]
    ConnectionReset,

    /// The input was rejected; never retried
    #[error("invalid embedding input: {0}")]
    InvalidInput(String),

    /// Authentication or authorization failure; never retried
    #[error("embedding auth error: {0}")]
    Auth(String),

    /// Anything else; never retried
    #[error("{0}")]
    Other(String),
}

impl EmbedError {
    /// Whether the retry policy may attempt this call again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmbedError::RateLimited
                | EmbedError::Server(_)
                | EmbedError::Timeout
                | EmbedError::ConnectionReset
        )
    }
}

/// Capability to turn text into an embedding vector
pub trait EmbedText {
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbedError>> + Send;
}

/// Wrapper that paces calls to an inner embedder with a governor rate
/// limiter. Composable with any [`EmbedText`]; sessions sharing a limit
/// should share the same limiter instance.
#[derive(Clone)]
pub struct RateLimitedEmbedder<E: EmbedText> {
    inner: E,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<E: EmbedText> RateLimitedEmbedder<E> {
    pub fn new(inner: E, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            inner,
            limiter: Arc::new(limiter),
        }
    }

    /// Convenience constructor for a per-second quota
    pub fn with_requests_per_second(inner: E, per_second: NonZeroU32) -> Self {
        Self::new(inner, GovernorLimiter::direct(Quota::per_second(per_second)))
    }
}

impl<E: EmbedText + Sync> EmbedText for RateLimitedEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.limiter
            .until_ready()
            .instrument(debug_span!("limiter"))
            .await;
        self.inner.embed(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(EmbedError::RateLimited.is_retryable());
        assert!(EmbedError::Server("500".into()).is_retryable());
        assert!(EmbedError::Timeout.is_retryable());
        assert!(EmbedError::ConnectionReset.is_retryable());

        assert!(!EmbedError::InvalidInput("empty".into()).is_retryable());
        assert!(!EmbedError::Auth("bad key".into()).is_retryable());
        assert!(!EmbedError::Other("weird".into()).is_retryable());
    }
}
