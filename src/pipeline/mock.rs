//! Mock embedder and store for tests and local development.
//!
//! `MockEmbedder` produces deterministic vectors and can be scripted to
//! fail; `MemoryStore` keeps records in memory and tracks insert batch
//! sizes. Both are usable outside this crate's tests, e.g. to dry-run an
//! ingestion without a real embedding provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::embedder::{EmbedError, EmbedText};
use super::store::{EmbeddingRecord, StoreError, VectorStore};

/// Deterministic embedder with scriptable failures
#[derive(Clone)]
pub struct MockEmbedder {
    dims: usize,
    calls: Arc<AtomicUsize>,
    failures: Arc<Mutex<VecDeque<EmbedError>>>,
}

impl MockEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            calls: Arc::new(AtomicUsize::new(0)),
            failures: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Queue errors to be returned by upcoming calls, in order, before
    /// successful responses resume
    pub fn fail_next(&self, errors: impl IntoIterator<Item = EmbedError>) {
        self.failures
            .lock()
            .expect("failure queue lock")
            .extend(errors);
    }

    /// Total embed calls made, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbedText for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.lock().expect("failure queue lock").pop_front() {
            return Err(err);
        }
        // Deterministic vector derived from the input length
        let seed = text.chars().count() as f32;
        Ok((0..self.dims).map(|i| seed + i as f32).collect())
    }
}

/// In-memory vector store tracking inserts and deletes
#[derive(Clone)]
pub struct MemoryStore {
    max_batch_size: usize,
    records: Arc<Mutex<Vec<EmbeddingRecord>>>,
    insert_batch_sizes: Arc<Mutex<Vec<usize>>>,
}

impl MemoryStore {
    pub fn new(max_batch_size: usize) -> Self {
        Self {
            max_batch_size,
            records: Arc::new(Mutex::new(Vec::new())),
            insert_batch_sizes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of stored records
    pub fn records(&self) -> Vec<EmbeddingRecord> {
        self.records.lock().expect("records lock").clone()
    }

    /// Sizes of the batches passed to `insert_records`, in call order
    pub fn insert_batch_sizes(&self) -> Vec<usize> {
        self.insert_batch_sizes
            .lock()
            .expect("batch sizes lock")
            .clone()
    }
}

impl VectorStore for MemoryStore {
    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn insert_records(&self, records: Vec<EmbeddingRecord>) -> Result<(), StoreError> {
        if records.len() > self.max_batch_size {
            return Err(StoreError::Backend(format!(
                "batch of {} exceeds maximum {}",
                records.len(),
                self.max_batch_size
            )));
        }
        self.insert_batch_sizes
            .lock()
            .expect("batch sizes lock")
            .push(records.len());
        self.records.lock().expect("records lock").extend(records);
        Ok(())
    }

    async fn delete_by_website(&self, website_url: &str) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("records lock")
            .retain(|r| r.website_url != website_url);
        Ok(())
    }
}
