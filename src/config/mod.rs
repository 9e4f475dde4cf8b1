//! Configuration module for Scuttle
//!
//! Configuration comes from an optional TOML file, with every field
//! overridable from the command line. Validation runs before the crawl
//! starts; configuration problems are the only fatal errors in the system.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, CrawlerConfig, OutputConfig};
pub use validation::validate;
