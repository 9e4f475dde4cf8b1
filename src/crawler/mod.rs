//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with timeout, retry, and outcome classification
//! - HTML parsing and link extraction
//! - Scope filtering of discovered links
//! - Overall crawl coordination over a worker pool

mod coordinator;
mod fetcher;
mod parser;
mod scope;

pub use coordinator::{CancelToken, Coordinator, CrawlSummary};
pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use parser::extract_links;
pub use scope::ScopePolicy;

use crate::config::Config;
use crate::Result;
use url::Url;

/// Runs a complete crawl from a seed URL
///
/// Convenience entry point: builds a [`Coordinator`] and runs it to
/// completion, returning the final summary.
pub async fn crawl(config: Config, seed: Url) -> Result<CrawlSummary> {
    let coordinator = Coordinator::new(config, seed)?;
    coordinator.run().await
}
