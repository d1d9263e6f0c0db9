//! # Content Extractor Module
//!
//! Turns raw HTML into structured content with a 0-100 quality score. This
//! is the first gate of the ingestion pipeline: the crawler feeds every
//! fetched page through [`parse`] and admits it only when
//! [`quality_score`] clears the configured minimum.
//!
//! ## Key Components
//!
//! - `ParsedContent`: structured view of a page (title, headings,
//!   paragraphs, main body, links, word statistics)
//! - `parse`: best-effort HTML extraction, infallible by design
//! - `quality_score`: additive 0-100 heuristic used as the admission gate
//! - `rules`: data-driven junk/boilerplate/selector tables
//!
//! Extraction degrades gracefully: priority content selectors first, then
//! the largest text-bearing block, then the whole body. A very short body
//! sets the `low_confidence` flag, signalling a likely client-rendered page
//! that needs a browser-capable fetch.

mod content;
mod quality;
pub mod rules;

pub use content::{normalize_text, parse};
pub use quality::quality_score;

use serde::{Deserialize, Serialize};

/// Sentinel title used when no title source qualifies
pub const UNTITLED_PAGE: &str = "Untitled Page";

/// A heading extracted from a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1-6
    pub level: u8,

    /// Heading text
    pub text: String,
}

/// Coarse language guess for extracted content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Unknown,
}

/// Structured content extracted from one HTML page.
///
/// Immutable once scored; the crawler hands it to the chunking pipeline and
/// discards it at the end of the crawl session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedContent {
    /// Source URL of the page
    pub url: String,

    /// Page title, or [`UNTITLED_PAGE`] when none was found
    pub title: String,

    /// Meta description, when present
    pub description: Option<String>,

    /// Main body text, whitespace-normalized, paragraph breaks preserved
    pub main_content: String,

    /// Headings in document order
    pub headings: Vec<Heading>,

    /// Paragraphs that passed the real-content heuristics
    pub paragraphs: Vec<String>,

    /// Absolute, fragment-stripped links found on the page
    pub links: Vec<String>,

    /// Whitespace-split word count of the main content
    pub word_count: usize,

    /// Estimated read time in minutes (225 words per minute)
    pub read_time_minutes: u32,

    /// Distinct normalized tokens over total tokens, 0-1
    pub unique_word_ratio: f64,

    /// Whether any paragraph matched a boilerplate pattern
    pub has_boilerplate: bool,

    /// Coarse language guess
    pub language: Language,

    /// Set when only a very short body was found; the page is likely
    /// client-rendered and needs a browser-capable fetch
    pub low_confidence: bool,
}
