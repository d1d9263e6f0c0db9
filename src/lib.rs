//! # sitesift - Website Content Ingestion for Semantic Search
//!
//! This crate crawls a website, extracts readable content from HTML, scores
//! its quality, splits it into overlapping chunks, and drives vector
//! embedding generation for semantic storage.
//!
//! ## Features
//!
//! - Bounded breadth-first crawling scoped to a single host
//! - Heuristic content extraction that separates article text from
//!   navigation, boilerplate, and ads
//! - A 0-100 quality score used as the crawl admission gate
//! - Session-scoped duplicate detection for pages and chunks
//! - Paragraph-aware chunking with configurable overlap
//! - An embedding pipeline with retry, backoff, and batched persistence
//! - Async API with Tokio
//!
//! The HTTP transport, embedding generator, and vector store are external
//! collaborators expressed as traits ([`crawler::FetchPage`],
//! [`pipeline::EmbedText`], [`pipeline::VectorStore`]); bring your own
//! implementations or use the bundled [`crawler::HttpFetcher`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitesift::crawler::{Crawler, CrawlerConfig, HttpFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::builder().max_pages(25).build()?;
//!     let fetcher = HttpFetcher::new(&config);
//!     let mut crawler = Crawler::new(fetcher, config);
//!
//!     let report = crawler.crawl("https://example.com").await?;
//!     for page in &report.pages {
//!         println!("{} (quality {})", page.content.url, page.quality_score);
//!     }
//!     Ok(())
//! }
//! ```

mod error;

pub mod crawler;
pub mod dedup;
pub mod extractor;
pub mod pipeline;

pub use error::Error;

/// Re-export of common types for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
