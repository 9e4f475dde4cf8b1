//! Scuttle: a same-domain mirroring crawler
//!
//! This crate implements a concurrent web crawler that discovers every page
//! reachable from a seed URL within the seed's domain, up to a depth limit,
//! and mirrors the fetched HTML to a local output directory.

pub mod config;
pub mod crawler;
pub mod frontier;
pub mod sink;
pub mod url;

use thiserror::Error;

/// Main error type for Scuttle operations
#[derive(Debug, Error)]
pub enum ScuttleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
///
/// These are the only fatal errors in the system: all of them are detected
/// before the crawl starts running. Everything that goes wrong per task
/// afterwards is logged, counted, and recovered.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error("Output directory is not writable: {0}")]
    OutputDir(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Scuttle operations
pub type Result<T> = std::result::Result<T, ScuttleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CancelToken, Coordinator, CrawlSummary, FetchResult};
pub use frontier::{CrawlTask, Frontier};
pub use url::normalize_url;
