//! HTTP fetcher with bounded retries.

mod user_agent;

pub use user_agent::{browser_headers, BROWSER_USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::rate_limiter::RateLimiter;
use super::{FetchError, PageSource};
use crate::config::Settings;

/// HTTP client presenting browser headers, with per-attempt timeout and a
/// fixed delay between attempts.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter,
    attempts: u32,
    retry_delay: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(timeout: Duration, attempts: u32, retry_delay: Duration) -> Result<Self, FetchError> {
        Self::with_rate_limiter(timeout, attempts, retry_delay, RateLimiter::new())
    }

    /// Create a new HTTP client with a shared rate limiter.
    pub fn with_rate_limiter(
        timeout: Duration,
        attempts: u32,
        retry_delay: Duration,
        rate_limiter: RateLimiter,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            rate_limiter,
            attempts: attempts.max(1),
            retry_delay,
        })
    }

    /// Build the process-wide client from settings.
    pub fn from_settings(settings: &Settings, rate_limiter: RateLimiter) -> Result<Self, FetchError> {
        Self::with_rate_limiter(
            settings.request_timeout(),
            settings.fetch_retries,
            settings.retry_delay(),
            rate_limiter,
        )
    }

    /// Get the rate limiter for this client.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// GET a page as text, retrying on transport errors and non-2xx status.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    debug!("Fetch attempt {}/{} failed: {}", attempt, self.attempts, e);
                    last_error = Some(e);
                }
            }
            if attempt < self.attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        let err = last_error.unwrap_or_else(|| FetchError::Transport {
            url: url.to_string(),
            message: "no attempts made".to_string(),
        });
        warn!("Giving up on {}: {}", url, err);
        Err(err)
    }

    async fn attempt(&self, url: &str) -> Result<String, FetchError> {
        let domain = self.rate_limiter.acquire(url).await;

        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if let Some(ref domain) = domain {
            if RateLimiter::is_rate_limit(status.as_u16()) {
                self.rate_limiter
                    .report_rate_limit(domain, status.as_u16())
                    .await;
            } else if status.is_success() {
                self.rate_limiter.report_success(domain).await;
            }
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.get_text(url).await
    }
}
