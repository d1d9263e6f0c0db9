//! Page fetch seam and the bundled HTTP implementation.
//!
//! The crawler is agnostic to how HTML is obtained: anything implementing
//! [`FetchPage`] works. The bundled [`HttpFetcher`] covers static and
//! server-rendered sites; an implementation backed by a headless browser
//! can stand in for client-rendered sites. The two are interchangeable, and
//! [`super::crawl_with_fallback`] retries a whole session with the slower
//! capable fetcher when the fast one accepts nothing.

use thiserror::Error;
use tracing::trace;

use super::config::CrawlerConfig;

/// Responses larger than this are treated as no usable content
pub const MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024;

/// Responses smaller than this are treated as no usable content
pub const MIN_RESPONSE_BYTES: usize = 32;

/// Error type for page fetches.
///
/// All variants are recoverable at the crawl level: the failing page is
/// logged, counted, and skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be completed
    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    /// Request exceeded the configured timeout
    #[error("Timed out fetching {0}")]
    Timeout(String),

    /// The response carried no usable HTML (bad status, too small, too large)
    #[error("No usable content from {url}: {reason}")]
    NoContent { url: String, reason: String },
}

/// Capability to fetch fully rendered HTML for a URL
pub trait FetchPage {
    fn fetch_rendered_html(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// reqwest-backed fetcher for static and server-rendered pages
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher using the crawler's timeout and user agent
    pub fn new(config: &CrawlerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl FetchPage for HttpFetcher {
    async fn fetch_rendered_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Request {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::NoContent {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }

        let html = response.text().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if html.len() < MIN_RESPONSE_BYTES {
            return Err(FetchError::NoContent {
                url: url.to_string(),
                reason: format!("{} bytes is too small", html.len()),
            });
        }
        if html.len() > MAX_RESPONSE_BYTES {
            return Err(FetchError::NoContent {
                url: url.to_string(),
                reason: format!("{} bytes exceeds the response cap", html.len()),
            });
        }

        trace!(url, bytes = html.len(), "fetched page");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CrawlerConfig {
        CrawlerConfig::builder()
            .fetch_timeout_secs(5)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetches_successful_response() {
        let mut server = mockito::Server::new_async().await;
        let body = format!(
            "<html><body><p>{}</p></body></html>",
            "Real page content. ".repeat(10)
        );
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_body(&body)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config());
        let html = fetcher
            .fetch_rendered_html(&format!("{}/page", server.url()))
            .await
            .unwrap();

        assert_eq!(html, body);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_2xx_is_no_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("not found page body, long enough to pass size checks")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config());
        let err = fetcher
            .fetch_rendered_html(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NoContent { .. }));
    }

    #[tokio::test]
    async fn test_undersized_response_is_no_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tiny")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config());
        let err = fetcher
            .fetch_rendered_html(&format!("{}/tiny", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NoContent { .. }));
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        let fetcher = HttpFetcher::new(&test_config());
        // Reserved TEST-NET address, nothing listens here
        let err = fetcher
            .fetch_rendered_html("http://192.0.2.1:9/page")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Request { .. } | FetchError::Timeout(_)
        ));
    }
}
