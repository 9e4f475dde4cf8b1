//! URL handling module for Scuttle
//!
//! Provides URL normalization and host extraction so that equivalent URLs
//! dedupe to a single frontier entry.

mod domain;
mod normalize;

pub use domain::extract_host;
pub use normalize::normalize_url;
