//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a per-request timeout
//! - GET requests for page content
//! - Retry with exponential backoff for transient failures
//! - Classification of every outcome into a [`FetchResult`]

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Initial backoff delay between retry attempts; doubles per attempt
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Result of a fetch operation
///
/// Every possible outcome of a GET is classified into exactly one variant.
/// None of them abort the crawl; the coordinator counts and logs failures
/// and moves on.
#[derive(Debug)]
pub enum FetchResult {
    /// 2xx response carrying HTML
    Success {
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body
        body: String,
    },

    /// 2xx response whose Content-Type is not `text/html`; body discarded
    SkippedNonHtml {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-2xx HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Connection, DNS, or protocol failure
    NetworkError {
        /// Error description
        error: String,
    },

    /// The request exceeded the configured timeout
    Timeout,
}

impl FetchResult {
    /// True for transient outcomes worth retrying
    fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::Timeout)
    }
}

/// Builds the shared HTTP client
///
/// The per-request timeout is configured here and covers the whole request,
/// including body download. Timeouts are per-fetch, never per-crawl.
///
/// # Arguments
///
/// * `user_agent` - User agent string to send with every request
/// * `timeout` - Per-request timeout
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs GETs with retry and classifies every outcome
///
/// The fetcher has no side effects beyond the network call: it never touches
/// the frontier or the sink, which keeps it testable against a mock server.
pub struct Fetcher {
    client: Client,
    retries: u32,
}

impl Fetcher {
    /// Creates a fetcher around an existing client
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client, carrying the timeout configuration
    /// * `retries` - Extra attempts after the first for transient failures
    ///   (network errors and timeouts); HTTP error statuses are never retried
    pub fn new(client: Client, retries: u32) -> Self {
        Self { client, retries }
    }

    /// Fetches a URL, retrying transient failures with exponential backoff
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let mut attempt = 0;
        loop {
            let result = self.fetch_once(url).await;

            if result.is_retryable() && attempt < self.retries {
                let delay = RETRY_BASE_DELAY * 2u32.saturating_pow(attempt);
                tracing::debug!(
                    "Transient failure fetching {} (attempt {}), retrying in {:?}",
                    url,
                    attempt + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return result;
        }
    }

    /// Issues a single GET and classifies the outcome
    async fn fetch_once(&self, url: &Url) -> FetchResult {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return FetchResult::SkippedNonHtml { content_type };
        }

        match response.text().await {
            Ok(body) => FetchResult::Success {
                status_code: status.as_u16(),
                content_type,
                body,
            },
            Err(e) => classify_error(e),
        }
    }
}

/// Maps a reqwest error onto the fetch taxonomy
fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::Timeout
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
        }
    }
}
