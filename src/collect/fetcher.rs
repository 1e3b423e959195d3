// Page fetching: the network boundary shared by both collectors.
//
// Collectors only ever ask for the text body of a URL. The HTTP
// implementation is a thin reqwest wrapper in the same shape as the other
// API clients; tests substitute an in-memory fetcher.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

const USER_AGENT: &str = "papermap/0.1 (conference paper collector)";

/// Retrieves page bodies. Implementations must be async because the real
/// one performs HTTP requests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the response body as text. Non-success
    /// statuses are errors.
    async fn fetch_text(&self, url: &Url) -> Result<String>;
}

/// reqwest-backed fetcher. Owns one connection pool for the collector's
/// lifetime; dropping it releases the pool.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request failed: {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("{url} returned {status}");
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))
    }
}

/// Parse a configured base URL into directory form (always ending in `/`)
/// so that relative joins append instead of replacing the last segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = format!("{}/", raw.trim().trim_end_matches('/'));
    Url::parse(&normalized).with_context(|| format!("Invalid base URL: {raw}"))
}
