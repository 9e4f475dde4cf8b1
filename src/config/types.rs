use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Scuttle
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the seed URL. Pages at exactly this depth
    /// are still fetched; their links are not followed.
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Size of the worker pool
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts for transient fetch failures
    #[serde(default)]
    pub retries: u32,

    /// Treat subdomains of the seed host as in scope
    #[serde(rename = "include-subdomains", default)]
    pub include_subdomains: bool,

    /// Optional path suffix a link must carry to be admitted (e.g. ".html")
    #[serde(rename = "scope-filter", default)]
    pub scope_filter: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory pages are mirrored into. When empty, the CLI derives it
    /// from the seed URL's host.
    #[serde(default)]
    pub directory: String,
}

impl CrawlerConfig {
    /// Per-request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            retries: 0,
            include_subdomains: false,
            scope_filter: None,
        }
    }
}

fn default_max_depth() -> u32 {
    3
}

fn default_concurrency() -> u32 {
    8
}

fn default_timeout_secs() -> u64 {
    10
}
