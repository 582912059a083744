//! Configuration module for Linksync
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and merging command-line overrides into them.
//!
//! # Example
//!
//! ```no_run
//! use linksync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linksync.toml")).unwrap();
//! println!("Store rate limit: {}", config.store.rate_limit);
//! ```

mod overrides;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ExportConfig, HealthCheckConfig, HttpConfig, LinkTextPolicy, SheetNames,
    SourceConfig, StoreConfig,
};

pub use overrides::{ExportOverrides, HealthCheckOverrides};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
