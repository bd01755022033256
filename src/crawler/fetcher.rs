//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests returning the raw body bytes
//! - HTTP 429 handling: honor Retry-After (or a default), then retry exactly once
//! - Error classification into a `FetchResult`

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::header::{HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered with something other than 429
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status: StatusCode,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Raw response body
        body: Vec<u8>,
    },

    /// The server answered 429 to both the request and its single retry
    RateLimited {
        /// The wait the server asked for on the last answer
        retry_after: Duration,
    },

    /// Connection refused, DNS failure, timeout or an unreadable body
    TransportError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Redirects follow reqwest's default policy.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sitesift::config::UserAgentConfig;
/// use sitesift::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Reads a `Retry-After` value as whole seconds
///
/// Anything other than a non-negative integer (HTTP dates included) falls back to
/// `default`.
pub fn parse_retry_after(value: Option<&HeaderValue>, default: Duration) -> Duration {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

/// Issues GET requests with the crawler's rate-limit policy
///
/// This is the only component that sleeps on behalf of a 429 answer. The sleep
/// ends early when the cancellation token fires.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    default_retry_after: Duration,
    cancel: CancellationToken,
}

impl Fetcher {
    pub fn new(client: Client, default_retry_after: Duration) -> Self {
        Self {
            client,
            default_retry_after,
            cancel: CancellationToken::new(),
        }
    }

    /// Makes the 429 backoff give up as soon as `cancel` fires
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds the client from configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler.request_timeout())?;
        Ok(Self::new(client, crawler.default_retry_after()))
    }

    /// Fetches a URL
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429 | Sleep Retry-After seconds (or the default), retry once |
    /// | HTTP 429 on the retry | → RateLimited |
    /// | Any other status | → Success |
    /// | Cancelled during the backoff | → RateLimited, no retry |
    /// | Transport failure | → TransportError, no retry |
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let response = match self.get(url).await {
            Ok(response) => response,
            Err(result) => return result,
        };

        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return read_body(response).await;
        }

        let wait = parse_retry_after(
            response.headers().get(RETRY_AFTER),
            self.default_retry_after,
        );
        tracing::warn!(
            "Rate limit exceeded for {}. Waiting for {} seconds.",
            url,
            wait.as_secs()
        );
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = self.cancel.cancelled() => {
                tracing::info!("Crawl cancelled, not retrying {}", url);
                return FetchResult::RateLimited { retry_after: wait };
            }
        }

        let retry = match self.get(url).await {
            Ok(response) => response,
            Err(result) => return result,
        };

        if retry.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = parse_retry_after(
                retry.headers().get(RETRY_AFTER),
                self.default_retry_after,
            );
            tracing::warn!("Still rate limited after retry: {}", url);
            return FetchResult::RateLimited { retry_after };
        }

        read_body(retry).await
    }

    async fn get(&self, url: &Url) -> Result<Response, FetchResult> {
        self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchResult::TransportError {
                error: classify_error(&e),
            })
    }
}

async fn read_body(response: Response) -> FetchResult {
    let status = response.status();
    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status,
            content_type,
            body: body.to_vec(),
        },
        Err(e) => FetchResult::TransportError {
            error: classify_error(&e),
        },
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Request timeout: {}", e)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
