use crate::config::types::Config;
use crate::ConfigError;
use std::path::Path;

/// Loads a configuration file from the given path
///
/// Every key is optional; missing sections fall back to the documented
/// defaults. Validation is a separate step ([`validate`]) run after any CLI
/// overrides have been applied.
///
/// [`validate`]: crate::config::validate
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use scuttle::config::load_config;
///
/// let config = load_config(Path::new("scuttle.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}
