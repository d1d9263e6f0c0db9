//! Vector persistence seam.
//!
//! Records are keyed by (website, page, chunk) and persisted by whatever
//! [`VectorStore`] implementation the pipeline was constructed with. The
//! store imposes its own maximum batch size; the pipeline chunks inserts
//! accordingly. Re-ingesting a website is delete-before-insert: stale
//! records are removed in bulk first so replacement is idempotent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The unit persisted for one surviving chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Website this record belongs to (bulk-delete key)
    pub website_url: String,

    /// Page the chunk came from
    pub page_url: String,

    /// Chunk text
    pub content_section: String,

    /// Embedding vector
    pub embedding: Vec<f32>,

    /// Caller metadata plus chunk position fields
    pub metadata: serde_json::Value,
}

/// Error type for vector store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend rejected or failed the operation
    #[error("store backend error: {0}")]
    Backend(String),

    /// Backend is unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Capability to persist and bulk-delete embedding records
pub trait VectorStore {
    /// Largest batch the backend accepts per insert call
    fn max_batch_size(&self) -> usize;

    fn insert_records(
        &self,
        records: Vec<EmbeddingRecord>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove every record for a website
    fn delete_by_website(
        &self,
        website_url: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
