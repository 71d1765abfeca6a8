//! HTTP page fetcher with cooperative request pacing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{FetchOutcome, PageFetcher, ScrapeError};

/// Default User-Agent for outgoing requests.
pub const USER_AGENT: &str =
    "oddsacquire/0.3 (+https://github.com/oddsacquire/oddsacquire)";

/// HTTP client that sleeps for a fixed delay before every request.
///
/// Pacing is cooperative: a plain pre-request sleep, no token bucket
/// and no adaptive backoff. Requests are issued strictly sequentially
/// by the callers.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_delay: Duration,
}

impl HttpClient {
    /// Create a new HTTP client. `user_agent` of `None` uses the
    /// built-in default.
    pub fn with_user_agent(
        timeout: Duration,
        request_delay: Duration,
        user_agent: Option<&str>,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(USER_AGENT))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            request_delay,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, ScrapeError> {
        if !self.request_delay.is_zero() {
            debug!(delay_ms = self.request_delay.as_millis() as u64, "pacing delay");
            tokio::time::sleep(self.request_delay).await;
        }

        debug!(url, "fetching");
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }

        let response = response.error_for_status()?;
        let body = response.text().await?;
        Ok(FetchOutcome::Page(body))
    }
}
