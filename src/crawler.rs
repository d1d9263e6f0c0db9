//! # Website Crawler Module
//!
//! Bounded breadth-first traversal of a single website. The crawler
//! dequeues candidate URLs in FIFO order, fetches each one through a
//! [`FetchPage`] implementation, extracts structured content, and admits
//! pages that clear the quality gate and are not duplicates of pages
//! already accepted this session.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: page budget, quality threshold, politeness delay
//! - `Crawler`: the traversal loop over an injected fetcher
//! - `CrawlReport`: accepted pages in discovery order plus skip counters
//! - `crawl_with_fallback`: session-level retry with a render-capable fetcher
//!
//! ## Guarantees
//!
//! - No URL is fetched more than once per session
//! - Only links on the exact starting host are followed
//! - A single page's fetch or parse failure is logged and skipped
//! - The crawl terminates after at most `max_pages` accepted pages, or when
//!   the frontier empties

mod config;
mod error;
mod fetch;
mod frontier;

pub use config::{CrawlerConfig, MAX_PAGES_HARD_CAP};
pub use error::CrawlError;
pub use fetch::{FetchError, FetchPage, HttpFetcher};
pub use frontier::Frontier;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::dedup::Deduplicator;
use crate::extractor::{self, ParsedContent};

/// A page accepted by the crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    /// Extracted content of the page
    pub content: ParsedContent,

    /// Quality score that admitted the page, 0-100
    pub quality_score: u8,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

/// Counters describing one crawl session
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CrawlStats {
    /// URLs dequeued and fetched (or attempted)
    pub pages_visited: usize,

    /// Pages that cleared the quality and duplicate gates
    pub pages_accepted: usize,

    /// Pages discarded for a quality score below the minimum
    pub skipped_low_quality: usize,

    /// Pages discarded as duplicates of already-accepted pages
    pub skipped_duplicate: usize,

    /// Fetches that failed and were skipped
    pub fetch_failures: usize,
}

/// Result of one crawl session: accepted pages in discovery order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlReport {
    pub pages: Vec<CrawledPage>,
    pub stats: CrawlStats,
}

/// Breadth-first crawler over an injected page fetcher
pub struct Crawler<F: FetchPage> {
    fetcher: F,
    config: CrawlerConfig,
    dedup: Deduplicator,
}

/// Scheme + host + port identity of the starting URL; links are eligible
/// only when all three match exactly (no subdomain generalization)
fn same_origin(base: &Url, candidate: &Url) -> bool {
    base.scheme() == candidate.scheme()
        && base.host_str() == candidate.host_str()
        && base.port_or_known_default() == candidate.port_or_known_default()
}

/// Parse and normalize a crawl URL: fragment stripped, trailing-slash form
/// canonicalized by the Url parser
fn normalize_url(url: &str) -> Result<Url, url::ParseError> {
    let mut parsed = Url::parse(url)?;
    parsed.set_fragment(None);
    Ok(parsed)
}

impl<F: FetchPage> Crawler<F> {
    pub fn new(fetcher: F, config: CrawlerConfig) -> Self {
        Self {
            fetcher,
            config,
            dedup: Deduplicator::new(),
        }
    }

    /// Crawl a website breadth-first from `start_url`.
    ///
    /// Returns accepted pages in discovery order. A crawl that accepts zero
    /// pages is an empty report, not an error; callers may retry with a
    /// render-capable fetcher (see [`crawl_with_fallback`]).
    #[instrument(skip(self), fields(max_pages = self.config.max_pages))]
    pub async fn crawl(&mut self, start_url: &str) -> Result<CrawlReport, CrawlError> {
        let base = normalize_url(start_url).map_err(|source| CrawlError::InvalidUrl {
            url: start_url.to_string(),
            source,
        })?;
        if base.host_str().is_none() || !matches!(base.scheme(), "http" | "https") {
            return Err(CrawlError::UnsupportedUrl(start_url.to_string()));
        }

        info!(url = %base, "starting crawl");
        self.dedup.reset();

        let mut frontier = Frontier::new();
        frontier.enqueue(base.as_str());

        let mut report = CrawlReport::default();
        while report.pages.len() < self.config.max_pages as usize {
            let Some(url) = frontier.dequeue() else {
                break;
            };

            // Cooperative politeness throttle: one fetch in flight, fixed
            // pause between successive requests
            if report.stats.pages_visited > 0 && self.config.inter_page_delay_ms > 0 {
                tokio::time::sleep(self.config.inter_page_delay()).await;
            }
            report.stats.pages_visited += 1;

            let html = match self.fetcher.fetch_rendered_html(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(url, error = %e, "fetch failed, skipping page");
                    report.stats.fetch_failures += 1;
                    continue;
                }
            };

            let content = extractor::parse(&html, &url);
            let quality_score = extractor::quality_score(&content);

            if quality_score < self.config.min_quality_score {
                debug!(url, quality_score, "below quality threshold, skipping");
                report.stats.skipped_low_quality += 1;
                continue;
            }

            if self
                .dedup
                .is_duplicate(&url, &content.title, &content.main_content)
            {
                debug!(url, "duplicate content, skipping");
                report.stats.skipped_duplicate += 1;
                continue;
            }

            for link in &content.links {
                let Ok(resolved) = normalize_url(link) else {
                    continue;
                };
                if same_origin(&base, &resolved) {
                    frontier.enqueue(resolved.as_str());
                }
            }

            debug!(url, quality_score, "accepted page");
            report.pages.push(CrawledPage {
                content,
                quality_score,
                fetched_at: Utc::now(),
            });
            report.stats.pages_accepted += 1;
        }

        info!(
            accepted = report.stats.pages_accepted,
            visited = report.stats.pages_visited,
            low_quality = report.stats.skipped_low_quality,
            duplicates = report.stats.skipped_duplicate,
            failures = report.stats.fetch_failures,
            "crawl finished"
        );
        Ok(report)
    }
}

/// Crawl with the fast fetcher, retrying the whole session with the slower
/// render-capable fetcher when nothing was accepted.
///
/// The fallback is session-level, not per-page: a zero-accepted outcome
/// usually means the whole site is client-rendered.
pub async fn crawl_with_fallback<Fast, Slow>(
    fast: Fast,
    slow: Slow,
    config: CrawlerConfig,
    start_url: &str,
) -> Result<CrawlReport, CrawlError>
where
    Fast: FetchPage,
    Slow: FetchPage,
{
    let report = Crawler::new(fast, config.clone()).crawl(start_url).await?;
    if !report.pages.is_empty() {
        return Ok(report);
    }

    info!(
        url = start_url,
        "no pages accepted with the fast fetcher, retrying with the render-capable fetcher"
    );
    Crawler::new(slow, config).crawl(start_url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher serving a fixed URL -> HTML map; unknown URLs fail
    #[derive(Clone, Default)]
    struct SiteFetcher {
        pages: HashMap<String, String>,
        fetches: Arc<AtomicUsize>,
    }

    impl SiteFetcher {
        fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl FetchPage for SiteFetcher {
        async fn fetch_rendered_html(&self, url: &str) -> Result<String, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Request {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                })
        }
    }

    /// HTML that scores comfortably above the default threshold
    fn good_page(title: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|l| format!("<a href=\"{l}\">{l}</a>"))
            .collect();
        let body = "This paragraph describes the topic of the page in complete \
                    sentences with plenty of ordinary words to read. "
            .repeat(4);
        format!(
            "<html><head><title>{title}</title></head><body>\
             <article><h1>{title}</h1><h2>Background</h2><h3>Details</h3>\
             <p>{body}</p><p>Second paragraph with different wording so the body \
             is not repetitive, covering extra details at some length here.</p></article>\
             {anchors}</body></html>"
        )
    }

    /// HTML that scores below the default threshold
    fn junk_page() -> String {
        "<html><body><div>hi</div></body></html>".to_string()
    }

    fn test_config(max_pages: u32) -> CrawlerConfig {
        CrawlerConfig::builder()
            .max_pages(max_pages)
            .inter_page_delay_ms(0)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_example_site_scenario() {
        let fetcher = SiteFetcher::default()
            .with_page(
                "https://example.com/",
                &good_page("Welcome", &["/about", "/blog/1"]),
            )
            .with_page("https://example.com/about", &junk_page())
            .with_page("https://example.com/blog/1", &good_page("First Post", &[]));

        let mut crawler = Crawler::new(fetcher, test_config(10));
        let report = crawler.crawl("https://example.com").await.unwrap();

        let urls: Vec<&str> = report
            .pages
            .iter()
            .map(|p| p.content.url.as_str())
            .collect();
        assert_eq!(
            urls,
            vec!["https://example.com/", "https://example.com/blog/1"]
        );
        assert_eq!(report.stats.pages_visited, 3);
        assert_eq!(report.stats.skipped_low_quality, 1);
        assert_eq!(report.stats.pages_accepted, 2);
    }

    #[tokio::test]
    async fn test_page_budget_terminates_crawl() {
        // Every page links onward, so only the budget stops the crawl
        let mut fetcher = SiteFetcher::default();
        for i in 0..20 {
            let next = format!("/page/{}", i + 1);
            fetcher = fetcher.with_page(
                &format!("https://example.com/page/{i}"),
                &good_page(&format!("Page {i}"), &[&next]),
            );
        }

        let mut crawler = Crawler::new(fetcher, test_config(3));
        let report = crawler.crawl("https://example.com/page/0").await.unwrap();

        assert_eq!(report.pages.len(), 3);
        assert_eq!(report.stats.pages_visited, 3);
    }

    #[tokio::test]
    async fn test_domain_scoping() {
        let fetcher = SiteFetcher::default().with_page(
            "https://example.com/",
            &good_page(
                "Root",
                &[
                    "https://other.example.net/page",
                    "https://sub.example.com/page",
                    "/local",
                ],
            ),
        );
        // /local is unknown so its fetch fails; the external hosts must
        // never even be attempted
        let mut crawler = Crawler::new(fetcher.clone(), test_config(10));
        let report = crawler.crawl("https://example.com").await.unwrap();

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.stats.fetch_failures, 1);
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_quality_gate() {
        let fetcher = SiteFetcher::default()
            .with_page("https://example.com/", &good_page("Root", &["/thin"]))
            .with_page("https://example.com/thin", &junk_page());

        let config = CrawlerConfig::builder()
            .max_pages(10)
            .min_quality_score(20)
            .inter_page_delay_ms(0)
            .build()
            .unwrap();
        let mut crawler = Crawler::new(fetcher, config);
        let report = crawler.crawl("https://example.com").await.unwrap();

        assert!(report.pages.iter().all(|p| p.quality_score >= 20));
        assert_eq!(report.stats.skipped_low_quality, 1);
    }

    #[tokio::test]
    async fn test_duplicate_pages_skipped() {
        // Two URLs serving identical content: the second is a duplicate
        let html = good_page("Same Page", &[]);
        let fetcher = SiteFetcher::default()
            .with_page("https://example.com/", &good_page("Root", &["/a", "/b"]))
            .with_page("https://example.com/a", &html)
            .with_page("https://example.com/b", &html);

        let mut crawler = Crawler::new(fetcher, test_config(10));
        let report = crawler.crawl("https://example.com").await.unwrap();

        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.stats.skipped_duplicate, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_abort() {
        let fetcher = SiteFetcher::default()
            .with_page(
                "https://example.com/",
                &good_page("Root", &["/broken", "/ok"]),
            )
            .with_page("https://example.com/ok", &good_page("Fine", &[]));

        let mut crawler = Crawler::new(fetcher, test_config(10));
        let report = crawler.crawl("https://example.com").await.unwrap();

        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.stats.fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_fragment_links_collapse_to_root() {
        let fetcher = SiteFetcher::default().with_page(
            "https://example.com/",
            &good_page("Root", &["#top", "/#section", "/"]),
        );

        let mut crawler = Crawler::new(fetcher.clone(), test_config(10));
        let report = crawler.crawl("https://example.com").await.unwrap();

        // Fragment variants normalize to the already-visited root
        assert_eq!(report.pages.len(), 1);
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_start_url() {
        let fetcher = SiteFetcher::default();
        let mut crawler = Crawler::new(fetcher.clone(), test_config(10));
        assert!(matches!(
            crawler.crawl("not a url").await,
            Err(CrawlError::InvalidUrl { .. })
        ));

        let mut crawler = Crawler::new(fetcher, test_config(10));
        assert!(matches!(
            crawler.crawl("ftp://example.com/").await,
            Err(CrawlError::UnsupportedUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fallback_to_render_capable_fetcher() {
        // Fast fetcher sees the client-rendered shell; slow fetcher sees
        // the hydrated page
        let fast = SiteFetcher::default().with_page("https://example.com/", &junk_page());
        let slow =
            SiteFetcher::default().with_page("https://example.com/", &good_page("Hydrated", &[]));

        let report = crawl_with_fallback(fast, slow.clone(), test_config(10), "https://example.com")
            .await
            .unwrap();

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].content.title, "Hydrated");
        assert_eq!(slow.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_fast_result_used_when_nonempty() {
        let fast = SiteFetcher::default().with_page("https://example.com/", &good_page("Fast", &[]));
        let slow = SiteFetcher::default();

        let report = crawl_with_fallback(fast, slow.clone(), test_config(10), "https://example.com")
            .await
            .unwrap();

        assert_eq!(report.pages[0].content.title, "Fast");
        assert_eq!(slow.fetch_count(), 0);
    }
}
