//! # Deduplication Service
//!
//! Detects duplicate and near-duplicate pages within one ingestion session
//! so duplicate content is never embedded or stored twice. Fingerprints are
//! held in memory only and cleared between sessions with [`Deduplicator::reset`].
//!
//! Two rules are live:
//!
//! 1. Exact content-hash equality (hash of lowercased, whitespace-collapsed
//!    text)
//! 2. Identical title hash with a byte-length difference under
//!    [`TITLE_LENGTH_DELTA`] (catches templated pages that swap the body but
//!    keep the title)
//!
//! Fuzzy similarity beyond exact hashing is deliberately not implemented:
//! [`Deduplicator::similarity`] performs a length-ratio pre-check but
//! returns 0.0 for any pair of non-identical hashes.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use serde::Serialize;
use tracing::debug;

/// Maximum byte-length difference for the same-title duplicate rule
pub const TITLE_LENGTH_DELTA: usize = 100;

/// Content fingerprint for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Hash of lowercased, whitespace-collapsed content
    pub content_hash: u64,

    /// Hash of the lowercased title
    pub title_hash: u64,

    /// Byte length of the normalized content
    pub byte_len: usize,
}

/// Counters reported by [`Deduplicator::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DedupStats {
    /// Fingerprints stored for unique pages
    pub unique_pages: usize,

    /// Duplicates detected this session
    pub duplicates_found: usize,

    /// `duplicates_found / (unique_pages + duplicates_found)`, 0 when empty
    pub duplicate_rate: f64,
}

/// Session-scoped duplicate detector for pages and chunks.
///
/// Single-writer by design: each crawl or ingestion session owns its own
/// instance (the chunk-level pipeline uses a separate instance from the
/// page-level crawl).
#[derive(Debug, Default)]
pub struct Deduplicator {
    fingerprints: HashMap<String, Fingerprint>,
    duplicates_found: usize,
}

fn hash_str(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Lowercase and collapse all whitespace runs to single spaces
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint for a (title, content) pair
    pub fn fingerprint(title: &str, content: &str) -> Fingerprint {
        let normalized = normalize(content);
        Fingerprint {
            content_hash: hash_str(&normalized),
            title_hash: hash_str(&normalize(title)),
            byte_len: normalized.len(),
        }
    }

    /// Check whether content duplicates an already-seen page, storing its
    /// fingerprint when it does not.
    ///
    /// A page never matches itself: re-submitting the same URL replaces its
    /// fingerprint and reports false. The first-seen fingerprint for other
    /// URLs is always the one retained.
    pub fn is_duplicate(&mut self, url: &str, title: &str, content: &str) -> bool {
        let candidate = Self::fingerprint(title, content);

        for (seen_url, seen) in &self.fingerprints {
            if seen_url == url {
                continue;
            }
            if seen.content_hash == candidate.content_hash {
                debug!(url, duplicate_of = %seen_url, "exact content duplicate");
                self.duplicates_found += 1;
                return true;
            }
            if seen.title_hash == candidate.title_hash
                && seen.byte_len.abs_diff(candidate.byte_len) < TITLE_LENGTH_DELTA
            {
                debug!(url, duplicate_of = %seen_url, "same title, near-identical length");
                self.duplicates_found += 1;
                return true;
            }
        }

        self.fingerprints.insert(url.to_string(), candidate);
        false
    }

    /// Similarity between two fingerprints.
    ///
    /// Known limitation, kept on purpose: identical content hashes score 1.0,
    /// everything else scores 0.0. The length-ratio pre-check only
    /// short-circuits pairs too different in size to ever match; it is not a
    /// fuzzy measure. True near-duplicate similarity (shingling, minhash)
    /// would be a deliberate extension of this design.
    pub fn similarity(a: &Fingerprint, b: &Fingerprint) -> f64 {
        let (shorter, longer) = if a.byte_len <= b.byte_len {
            (a.byte_len, b.byte_len)
        } else {
            (b.byte_len, a.byte_len)
        };
        if longer > 0 && (shorter as f64 / longer as f64) < 0.5 {
            return 0.0;
        }
        if a.content_hash == b.content_hash { 1.0 } else { 0.0 }
    }

    /// Session counters
    pub fn stats(&self) -> DedupStats {
        let unique_pages = self.fingerprints.len();
        let total = unique_pages + self.duplicates_found;
        DedupStats {
            unique_pages,
            duplicates_found: self.duplicates_found,
            duplicate_rate: if total == 0 {
                0.0
            } else {
                self.duplicates_found as f64 / total as f64
            },
        }
    }

    /// Clear all fingerprints and counters between ingestion runs
    pub fn reset(&mut self) {
        self.fingerprints.clear();
        self.duplicates_found = 0;
    }
}
