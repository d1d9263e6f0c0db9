//! # Embedding Pipeline Module
//!
//! Drives chunk → embed → persist for one page of extracted content, with
//! resilience to transient embedding failures and an eye on cost: chunks
//! are deduplicated and filtered *before* any embedding call is made, and
//! pages whose chunks are all duplicates or low-value produce zero calls.
//!
//! ## Key Components
//!
//! - `split_text`: paragraph-aware chunking with overlap
//! - `EmbeddingPipeline`: the coordinator over injected [`EmbedText`] and
//!   [`VectorStore`] capabilities
//! - `RateLimiter`: shared in-flight bound for embedding calls
//! - `RateLimitedEmbedder`: governor-paced wrapper for any embedder
//! - `mock`: deterministic embedder/store for tests and dry runs
//!
//! Within a batch chunks embed concurrently (bounded by the shared rate
//! limiter); batches run in sequence. A chunk that exhausts its retries
//! fails the whole page's `store_embeddings` call: records are buffered and
//! only persisted once every batch has embedded, so a page is stored
//! all-or-nothing.

mod chunking;
mod config;
mod embedder;
mod error;
mod limiter;
pub mod mock;
mod store;

pub use chunking::{MIN_CHUNK_WORDS, is_low_value, split_text};
pub use config::{ChunkOptions, PipelineConfig};
pub use embedder::{EmbedError, EmbedText, RateLimitedEmbedder};
pub use error::PipelineError;
pub use limiter::{InFlightPermit, RateLimiter};
pub use store::{EmbeddingRecord, StoreError, VectorStore};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// A chunk prepared for embedding
#[derive(Debug, Clone, Serialize)]
pub struct TextChunk {
    /// Chunk text
    pub text: String,

    /// Position among the surviving chunks of the page
    pub index: usize,

    /// Surviving chunk count for the page
    pub total_chunks: usize,

    /// Page the chunk came from
    pub source_page_url: String,
}

/// Chunk economics for one `store_embeddings` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmbedReport {
    /// Chunks produced by the splitter
    pub chunks_created: usize,

    /// Chunks embedded and persisted
    pub chunks_saved: usize,

    /// Chunks dropped as duplicates or low-value before embedding
    pub chunks_skipped: usize,
}

/// Prepare a page's content for embedding: truncate, split, deduplicate by
/// normalized 200-char prefix, and drop low-value chunks.
///
/// Returns the surviving chunks and the count produced by the splitter
/// before filtering. Prefix state is per-call: chunk-level deduplication is
/// independent of the page-level [`crate::dedup::Deduplicator`].
pub fn prepare_chunks(
    content: &str,
    page_url: &str,
    options: &ChunkOptions,
    max_content_length: usize,
) -> (Vec<TextChunk>, usize) {
    let truncated: String = content.chars().take(max_content_length).collect();
    if truncated.len() < content.len() {
        debug!(
            page_url,
            max_content_length, "content truncated before chunking"
        );
    }

    let raw = split_text(&truncated, options);
    let created = raw.len();

    let mut seen_prefixes: HashSet<String> = HashSet::new();
    let survivors: Vec<String> = raw
        .into_iter()
        .filter(|chunk| {
            let prefix: String = chunk.to_lowercase().chars().take(200).collect();
            seen_prefixes.insert(prefix) && !is_low_value(chunk)
        })
        .collect();

    let total = survivors.len();
    let chunks = survivors
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk {
            text,
            index,
            total_chunks: total,
            source_page_url: page_url.to_string(),
        })
        .collect();
    (chunks, created)
}

/// Coordinates chunking, embedding, and persistence for one page at a time
pub struct EmbeddingPipeline<E: EmbedText, S: VectorStore> {
    embedder: E,
    store: S,
    limiter: Arc<RateLimiter>,
    config: PipelineConfig,
}

impl<E: EmbedText, S: VectorStore> EmbeddingPipeline<E, S> {
    pub fn new(embedder: E, store: S, limiter: Arc<RateLimiter>, config: PipelineConfig) -> Self {
        Self {
            embedder,
            store,
            limiter,
            config,
        }
    }

    /// Chunk, embed, and persist one page's content.
    ///
    /// Fails fast on empty inputs. When every chunk is filtered out the
    /// call returns early with `chunks_saved = 0` and no embedding calls
    /// made. A chunk that fails embedding terminally (non-retryable error
    /// or exhausted retries) fails the whole call; nothing is persisted.
    #[instrument(skip(self, content, metadata))]
    pub async fn store_embeddings(
        &self,
        website_url: &str,
        page_url: &str,
        content: &str,
        metadata: Value,
    ) -> Result<EmbedReport, PipelineError> {
        if website_url.trim().is_empty() {
            return Err(PipelineError::Validation("website_url is empty".into()));
        }
        if page_url.trim().is_empty() {
            return Err(PipelineError::Validation("page_url is empty".into()));
        }
        if content.trim().is_empty() {
            return Err(PipelineError::Validation("content is empty".into()));
        }

        let (chunks, chunks_created) = prepare_chunks(
            content,
            page_url,
            &self.config.chunk_options,
            self.config.max_content_length,
        );

        if chunks.is_empty() {
            info!(
                page_url,
                chunks_created, "no chunks worth embedding, skipping page"
            );
            return Ok(EmbedReport {
                chunks_created,
                chunks_saved: 0,
                chunks_skipped: chunks_created,
            });
        }

        let chunks_saved = chunks.len();
        let chunks_skipped = chunks_created - chunks_saved;
        debug!(page_url, chunks_created, chunks_saved, "embedding chunks");

        // Concurrent within a batch, sequential across batches
        let mut records = Vec::with_capacity(chunks_saved);
        for batch in chunks.chunks(self.config.embedding_batch_size) {
            let embeddings =
                try_join_all(batch.iter().map(|chunk| self.embed_with_retry(&chunk.text))).await?;
            for (chunk, embedding) in batch.iter().zip(embeddings) {
                records.push(EmbeddingRecord {
                    website_url: website_url.to_string(),
                    page_url: page_url.to_string(),
                    content_section: chunk.text.clone(),
                    embedding,
                    metadata: chunk_metadata(&metadata, chunk),
                });
            }
        }

        // All chunks embedded; persist respecting the store's batch cap
        for batch in records.chunks(self.store.max_batch_size().max(1)) {
            self.store.insert_records(batch.to_vec()).await?;
        }

        info!(page_url, chunks_saved, chunks_skipped, "page embedded");
        Ok(EmbedReport {
            chunks_created,
            chunks_saved,
            chunks_skipped,
        })
    }

    /// Bulk-delete every record for a website, making re-ingestion an
    /// idempotent replacement rather than an accumulation
    #[instrument(skip(self))]
    pub async fn delete_website_embeddings(&self, website_url: &str) -> Result<(), PipelineError> {
        if website_url.trim().is_empty() {
            return Err(PipelineError::Validation("website_url is empty".into()));
        }
        self.store.delete_by_website(website_url).await?;
        info!(website_url, "deleted stored embeddings");
        Ok(())
    }

    /// Embed one chunk with exponential backoff on retryable failures.
    ///
    /// The shared limiter slot is held only for the duration of each
    /// attempt, never across backoff sleeps.
    async fn embed_with_retry(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        if text.is_empty() {
            return Err(PipelineError::Validation("chunk text is empty".into()));
        }
        if text.chars().count() > self.config.max_content_length {
            return Err(PipelineError::Validation(format!(
                "chunk of {} chars exceeds the embedding input bound",
                text.chars().count()
            )));
        }

        let max_attempts = self.config.max_embedding_retries + 1;
        let mut last_err = None;
        for attempt in 0..max_attempts {
            let result = {
                let _permit = self.limiter.acquire().await?;
                self.embedder.embed(text).await
            };
            match result {
                Ok(embedding) => return Ok(embedding),
                Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                    let delay = backoff_delay(self.config.retry_base_delay_ms, attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retryable embedding failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    last_err = Some(e);
                }
                Err(e) if e.is_retryable() => {
                    return Err(PipelineError::RetriesExhausted {
                        attempts: max_attempts,
                        source: e,
                    });
                }
                Err(e) => return Err(PipelineError::Embedding(e)),
            }
        }
        // Loop always returns; this is unreachable with max_attempts >= 1
        Err(PipelineError::RetriesExhausted {
            attempts: max_attempts,
            source: last_err.unwrap_or(EmbedError::Other("no attempts made".into())),
        })
    }
}

/// Exponential backoff delay for a retry attempt, saturating instead of
/// overflowing for large attempt counts
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(2u64.saturating_pow(attempt)))
}

/// Caller metadata merged with the chunk's position fields
fn chunk_metadata(metadata: &Value, chunk: &TextChunk) -> Value {
    let mut map = match metadata {
        Value::Object(m) => m.clone(),
        Value::Null => serde_json::Map::new(),
        other => {
            let mut m = serde_json::Map::new();
            m.insert("metadata".to_string(), other.clone());
            m
        }
    };
    map.insert("chunk_index".to_string(), chunk.index.into());
    map.insert("total_chunks".to_string(), chunk.total_chunks.into());
    Value::Object(map)
}
