//! Command-line overrides for the file configuration
//!
//! Each subcommand collects its flags into one of these structs. Applying
//! them re-validates the merged configuration.

use crate::config::types::{Config, LinkTextPolicy};
use crate::config::validation::validate;
use crate::ConfigError;

/// Overrides accepted by `sync-links`
#[derive(Debug, Clone, Default)]
pub struct ExportOverrides {
    pub chunk_size: Option<usize>,
    pub max_links: Option<u64>,
    pub rate_limit: Option<u32>,
    pub link_text: Option<LinkTextPolicy>,
}

impl ExportOverrides {
    pub fn apply(self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(chunk_size) = self.chunk_size {
            config.export.chunk_size = chunk_size;
        }
        if let Some(max_links) = self.max_links {
            config.export.max_links = max_links;
        }
        if let Some(rate_limit) = self.rate_limit {
            config.store.rate_limit = rate_limit;
        }
        if let Some(link_text) = self.link_text {
            config.export.link_text = link_text;
        }
        validate(config)
    }
}

/// Overrides accepted by `healthcheck-links`
#[derive(Debug, Clone, Default)]
pub struct HealthCheckOverrides {
    pub runtime: Option<u64>,
    pub max_links: Option<u64>,
    pub batch_size: Option<usize>,
    pub query_size: Option<u64>,
    pub rate_limit: Option<u32>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,

    /// Replaces the configured list when non-empty
    pub excluded_protocols: Vec<String>,
}

impl HealthCheckOverrides {
    pub fn apply(self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(runtime) = self.runtime {
            config.healthcheck.runtime = runtime;
        }
        if let Some(max_links) = self.max_links {
            config.healthcheck.max_links = max_links;
        }
        if let Some(batch_size) = self.batch_size {
            config.healthcheck.batch_size = batch_size;
        }
        if let Some(query_size) = self.query_size {
            config.healthcheck.query_size = query_size;
        }
        if let Some(rate_limit) = self.rate_limit {
            config.store.rate_limit = rate_limit;
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout = timeout;
        }
        if self.proxy.is_some() {
            config.http.proxy = self.proxy;
        }
        if let Some(user_agent) = self.user_agent {
            config.http.user_agent = user_agent;
        }
        if !self.excluded_protocols.is_empty() {
            config.http.excluded_protocols = self.excluded_protocols;
        }
        validate(config)
    }
}
