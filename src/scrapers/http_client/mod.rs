//! Plain-HTTP page fetcher.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::politeness::PolitenessGate;
use super::PageFetcher;

/// Default user agent: current desktop Chrome on Windows. Storefronts
/// routinely serve bot-looking clients an empty shell.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// The configured user agent override, or [`USER_AGENT`].
pub fn resolve_user_agent(configured: Option<&str>) -> String {
    configured
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .unwrap_or(USER_AGENT)
        .to_string()
}

/// Errors raised by a single fetch. Callers isolate these per page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// HTTP client that sends a browser user agent and passes every request
/// through a [`PolitenessGate`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    gate: PolitenessGate,
}

impl HttpClient {
    /// Create a new HTTP client sending `user_agent`, or [`USER_AGENT`] when
    /// none is configured.
    pub fn new(
        timeout: Duration,
        gate: PolitenessGate,
        user_agent: Option<&str>,
    ) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(user_agent);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, gate })
    }

    /// The gate this client waits on.
    pub fn gate(&self) -> &PolitenessGate {
        &self.gate
    }

    /// GET a page and return its body. Any non-success status is an error.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        self.gate.acquire().await;

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(
            "GET {} -> {} in {}ms",
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.get_text(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_fails_before_request() {
        let client = HttpClient::new(
            Duration::from_secs(1),
            PolitenessGate::unthrottled(1),
            None,
        )
        .unwrap();
        let err = client.get_text("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        assert_eq!(client.gate().total_requests().await, 0);
    }

    #[test]
    fn test_resolve_user_agent() {
        assert_eq!(resolve_user_agent(None), USER_AGENT);
        assert_eq!(resolve_user_agent(Some("  ")), USER_AGENT);
        assert_eq!(resolve_user_agent(Some("MyBot/1.0")), "MyBot/1.0");
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            url: "https://shop.example.com/sale".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "https://shop.example.com/sale returned HTTP 404");
    }
}
