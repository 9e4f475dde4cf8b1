use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the full configuration against a seed URL
///
/// Called once, after CLI overrides are applied and before the crawl starts.
/// Anything rejected here is a fatal configuration error; nothing after this
/// point aborts the crawl.
pub fn validate(config: &Config, seed: &str) -> Result<(), ConfigError> {
    validate_seed(seed)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the seed URL: parsable, http(s), and carrying a host
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(seed).map_err(|e| ConfigError::InvalidSeed(format!("'{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidSeed(format!(
            "'{}': scheme must be http or https, got {}",
            seed,
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidSeed(format!("'{}': missing host", seed)));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 256 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 256, got {}",
            config.concurrency
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }

    if config.retries > 10 {
        return Err(ConfigError::Validation(format!(
            "retries must be at most 10, got {}",
            config.retries
        )));
    }

    if let Some(filter) = &config.scope_filter {
        if filter.is_empty() {
            return Err(ConfigError::Validation(
                "scope-filter cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
