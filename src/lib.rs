//! Linksync: rate-limited link export and health checking
//!
//! This crate copies external-link records from a relational source into a
//! spreadsheet-style tabular store, then periodically probes each link over HTTP
//! and writes the results back, while keeping store callouts under a per-minute
//! rate limit.

pub mod config;
pub mod export;
pub mod healthcheck;
pub mod limiter;
pub mod probe;
pub mod source;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for Linksync operations
#[derive(Debug, Error)]
pub enum LinkSyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] source::SourceError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Range error: {0}")]
    Range(#[from] UrlError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),
}

/// URL and range parsing errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Invalid column: {0}")]
    InvalidColumn(String),
}

/// Result type alias for Linksync operations
pub type Result<T> = std::result::Result<T, LinkSyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use limiter::RateLimiter;
pub use url::{normalize_link, split_url, Normalized, NormalizedLink};
