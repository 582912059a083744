use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Main configuration structure for Linksync
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub sheets: SheetNames,
    pub source: SourceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub healthcheck: HealthCheckConfig,
}

/// Remote tabular store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    /// Identifier of the spreadsheet holding all sheets
    pub spreadsheet_id: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    /// Base URL of the values API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Maximum store callouts per minute
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,

    /// Retries for transient store failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial delay between retries (milliseconds), doubled on each retry
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl StoreConfig {
    /// Reads the bearer token from the configured environment variable
    pub fn access_token(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.access_token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(ConfigError::MissingCredential(self.access_token_env.clone())),
        }
    }
}

/// Names of the sheets the pipelines read and write
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SheetNames {
    /// Export target
    pub all_links: String,

    /// View of exported links not yet tracked
    pub new_links: String,

    /// One row per tracked link with its health check results
    pub links_status: String,

    /// View of the links due for a check, in priority order
    pub next_check: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            all_links: "ALL_LINKS".to_string(),
            new_links: "NEW_LINKS".to_string(),
            links_status: "LINKS_STATUS".to_string(),
            next_check: "NEXT_CHECK".to_string(),
        }
    }
}

/// Relational source configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Path to the SQLite database holding the link tables
    pub database_path: String,
}

/// HTTP probing configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HttpConfig {
    /// Protocol prefixes that are never exported or probed
    pub excluded_protocols: Vec<String>,

    /// Probe timeout (seconds)
    pub timeout: u64,

    /// Optional proxy for all probes
    pub proxy: Option<String>,

    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            excluded_protocols: vec!["mailto".to_string(), "ftp".to_string()],
            timeout: 30,
            proxy: None,
            user_agent: format!("linksync/{} HealthCheckLinks", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Link export configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExportConfig {
    /// Source rows read per chunk
    pub chunk_size: usize,

    /// Maximum source rows processed per run (0 = unlimited)
    pub max_links: u64,

    /// When link text is looked up
    pub link_text: LinkTextPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            max_links: 0,
            link_text: LinkTextPolicy::default(),
        }
    }
}

/// Health check configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HealthCheckConfig {
    /// Maximum run time (seconds)
    pub runtime: u64,

    /// Maximum probes per run (0 = unlimited)
    pub max_links: u64,

    /// Updates written per flush
    pub batch_size: usize,

    /// Rows read per page
    pub query_size: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            runtime: 300,
            max_links: 0,
            batch_size: 20,
            query_size: 1000,
        }
    }
}

/// When the exporter looks up the anchor text of a link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkTextPolicy {
    /// Export three columns and never look up link text
    Never,

    /// Look up link text for every exported row
    Always,

    /// Look up link text once per canonical URL per run
    #[default]
    FirstOccurrence,
}

impl LinkTextPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Always => "always",
            Self::FirstOccurrence => "first-occurrence",
        }
    }
}

impl fmt::Display for LinkTextPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkTextPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            "first-occurrence" => Ok(Self::FirstOccurrence),
            other => Err(ConfigError::Validation(format!(
                "link-text must be one of never, always, first-occurrence, got '{}'",
                other
            ))),
        }
    }
}

fn default_access_token_env() -> String {
    "LINKSYNC_ACCESS_TOKEN".to_string()
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_rate_limit() -> u32 {
    crate::limiter::DEFAULT_RATE_LIMIT
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}
