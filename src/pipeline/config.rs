//! # Pipeline Configuration Module
//!
//! Configuration for chunking and embedding, with builders in the same
//! shape as the crawler configuration. Everything is validated when the
//! builder finishes; in particular `chunk_overlap >= chunk_size` is rejected
//! outright because it would break forward progress in the hard-split
//! fallback of the chunker.

use super::error::PipelineError;

/// Configuration for splitting text into chunks
#[derive(Debug, Clone)]
pub struct ChunkOptions {
    /// Target maximum size of each chunk in characters (default 1000)
    pub chunk_size: usize,

    /// Overlap carried between consecutive chunks in characters (default 200)
    pub chunk_overlap: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkOptions {
    /// Enforce `0 <= chunk_overlap < chunk_size`
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.chunk_size == 0 {
            return Err(PipelineError::Validation(
                "chunk_size must be nonzero".into(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(PipelineError::Validation(format!(
                "chunk_overlap {} must be smaller than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Configuration for the embedding pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Options for chunking
    pub chunk_options: ChunkOptions,

    /// Page content is truncated to this many characters before chunking
    /// (default 8000)
    pub max_content_length: usize,

    /// Chunks embedded concurrently per batch (default 10)
    pub embedding_batch_size: usize,

    /// Retry budget for retryable embedding failures (default 3)
    pub max_embedding_retries: u32,

    /// Base delay for exponential backoff in milliseconds (default 500)
    pub retry_base_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_options: ChunkOptions::default(),
            max_content_length: 8000,
            embedding_batch_size: 10,
            max_embedding_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    fn validate(&self) -> Result<(), PipelineError> {
        self.chunk_options.validate()?;
        if self.max_content_length == 0 {
            return Err(PipelineError::Validation(
                "max_content_length must be nonzero".into(),
            ));
        }
        if self.embedding_batch_size == 0 {
            return Err(PipelineError::Validation(
                "embedding_batch_size must be nonzero".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the target chunk size in characters
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_options.chunk_size = chunk_size;
        self
    }

    /// Set the chunk overlap in characters
    pub fn chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.config.chunk_options.chunk_overlap = chunk_overlap;
        self
    }

    /// Set the per-page content cap
    pub fn max_content_length(mut self, max_content_length: usize) -> Self {
        self.config.max_content_length = max_content_length;
        self
    }

    /// Set the embedding batch size
    pub fn embedding_batch_size(mut self, embedding_batch_size: usize) -> Self {
        self.config.embedding_batch_size = embedding_batch_size;
        self
    }

    /// Set the retry budget for retryable embedding failures
    pub fn max_embedding_retries(mut self, max_embedding_retries: u32) -> Self {
        self.config.max_embedding_retries = max_embedding_retries;
        self
    }

    /// Set the backoff base delay
    pub fn retry_base_delay_ms(mut self, retry_base_delay_ms: u64) -> Self {
        self.config.retry_base_delay_ms = retry_base_delay_ms;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
