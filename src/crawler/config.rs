//! # Crawler Configuration Module
//!
//! Configuration for the breadth-first crawler, using a builder pattern in
//! the same shape as the pipeline configuration. All values are validated
//! when the builder finishes: an out-of-range page budget or a zero timeout
//! fails fast rather than surfacing mid-crawl.

use std::time::Duration;

use super::error::CrawlError;

/// Hard cap on the accepted-page budget, independent of configuration
pub const MAX_PAGES_HARD_CAP: u32 = 100;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of accepted pages per crawl (default 50, capped at 100)
    pub max_pages: u32,

    /// Minimum quality score for a page to be accepted (default 20)
    pub min_quality_score: u8,

    /// Delay between successive fetches in milliseconds (default 1000)
    pub inter_page_delay_ms: u64,

    /// Per-request fetch timeout in seconds (default 30)
    pub fetch_timeout_secs: u64,

    /// User agent sent by the bundled HTTP fetcher
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            min_quality_score: 20,
            inter_page_delay_ms: 1000,
            fetch_timeout_secs: 30,
            user_agent: format!("sitesift-crawler/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Inter-page delay as a Duration
    pub fn inter_page_delay(&self) -> Duration {
        Duration::from_millis(self.inter_page_delay_ms)
    }

    /// Fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    fn validate(&self) -> Result<(), CrawlError> {
        if self.max_pages == 0 {
            return Err(CrawlError::Config("max_pages must be at least 1".into()));
        }
        if self.max_pages > MAX_PAGES_HARD_CAP {
            return Err(CrawlError::Config(format!(
                "max_pages {} exceeds the hard cap of {MAX_PAGES_HARD_CAP}",
                self.max_pages
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(CrawlError::Config("fetch_timeout_secs must be nonzero".into()));
        }
        Ok(())
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the accepted-page budget
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the minimum quality score for admission
    pub fn min_quality_score(mut self, min_quality_score: u8) -> Self {
        self.config.min_quality_score = min_quality_score;
        self
    }

    /// Set the delay between successive fetches
    pub fn inter_page_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.inter_page_delay_ms = delay_ms;
        self
    }

    /// Set the per-request fetch timeout
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    /// Set the user agent used by the bundled fetcher
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<CrawlerConfig, CrawlError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CrawlerConfig::builder().build().unwrap();
        assert_eq!(config.max_pages, 50);
        assert_eq!(config.min_quality_score, 20);
        assert_eq!(config.inter_page_delay_ms, 1000);
    }

    #[test]
    fn test_page_budget_hard_cap() {
        assert!(CrawlerConfig::builder().max_pages(100).build().is_ok());
        assert!(CrawlerConfig::builder().max_pages(101).build().is_err());
        assert!(CrawlerConfig::builder().max_pages(0).build().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(
            CrawlerConfig::builder()
                .fetch_timeout_secs(0)
                .build()
                .is_err()
        );
    }
}
