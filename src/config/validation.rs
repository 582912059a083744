use crate::config::types::{
    Config, ExportConfig, HealthCheckConfig, HttpConfig, SheetNames, SourceConfig, StoreConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_store_config(&config.store)?;
    validate_sheet_names(&config.sheets)?;
    validate_source_config(&config.source)?;
    validate_http_config(&config.http)?;
    validate_export_config(&config.export)?;
    validate_healthcheck_config(&config.healthcheck)?;
    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.spreadsheet_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "spreadsheet-id cannot be empty".to_string(),
        ));
    }

    if config.access_token_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "access-token-env cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.api_base).map_err(|e| {
        ConfigError::Validation(format!("Invalid api-base '{}': {}", config.api_base, e))
    })?;

    if config.rate_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "rate-limit must be >= 1, got {}",
            config.rate_limit
        )));
    }

    Ok(())
}

/// Validates sheet names
fn validate_sheet_names(sheets: &SheetNames) -> Result<(), ConfigError> {
    let names = [
        ("all-links", &sheets.all_links),
        ("new-links", &sheets.new_links),
        ("links-status", &sheets.links_status),
        ("next-check", &sheets.next_check),
    ];

    for (key, name) in names {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "sheet name '{}' cannot be empty",
                key
            )));
        }
        if name.contains('!') {
            return Err(ConfigError::Validation(format!(
                "sheet name '{}' cannot contain '!', got '{}'",
                key, name
            )));
        }
    }

    Ok(())
}

fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP probing configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    for protocol in &config.excluded_protocols {
        validate_protocol(protocol)?;
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1 second, got {}",
            config.timeout
        )));
    }

    if let Some(proxy) = &config.proxy {
        Url::parse(proxy)
            .map_err(|e| ConfigError::Validation(format!("Invalid proxy '{}': {}", proxy, e)))?;
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates an excluded protocol prefix
///
/// Protocols follow URI scheme syntax: letters plus `+`, `.` and `-`.
fn validate_protocol(protocol: &str) -> Result<(), ConfigError> {
    if protocol.is_empty() {
        return Err(ConfigError::Validation(
            "excluded protocol cannot be empty".to_string(),
        ));
    }

    let valid = protocol
        .chars()
        .all(|c| c.is_ascii_alphabetic() || matches!(c, '+' | '.' | '-'));

    if !valid {
        return Err(ConfigError::Validation(format!(
            "excluded protocol '{}' may only contain letters, '+', '.' and '-'",
            protocol
        )));
    }

    Ok(())
}

fn validate_export_config(config: &ExportConfig) -> Result<(), ConfigError> {
    if config.chunk_size < 1 {
        return Err(ConfigError::Validation(format!(
            "chunk-size must be >= 1, got {}",
            config.chunk_size
        )));
    }

    Ok(())
}

/// Validates health check configuration
fn validate_healthcheck_config(config: &HealthCheckConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.query_size < 1 {
        return Err(ConfigError::Validation(format!(
            "query-size must be >= 1, got {}",
            config.query_size
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            store: StoreConfig {
                spreadsheet_id: "sheet123".to_string(),
                access_token_env: "LINKSYNC_ACCESS_TOKEN".to_string(),
                api_base: "https://sheets.googleapis.com/v4".to_string(),
                rate_limit: 60,
                max_retries: 3,
                retry_delay_ms: 1000,
            },
            sheets: SheetNames::default(),
            source: SourceConfig {
                database_path: "./links.sqlite".to_string(),
            },
            http: HttpConfig::default(),
            export: ExportConfig::default(),
            healthcheck: HealthCheckConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&test_config()).is_ok());
    }

    #[test]
    fn test_empty_spreadsheet_id() {
        let mut config = test_config();
        config.store.spreadsheet_id = "  ".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_rate_limit() {
        let mut config = test_config();
        config.store.rate_limit = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_sheet_name() {
        let mut config = test_config();
        config.sheets.next_check = "NEXT!CHECK".to_string();
        assert!(validate(&config).is_err());

        config.sheets.next_check = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_excluded_protocols() {
        assert!(validate_protocol("mailto").is_ok());
        assert!(validate_protocol("svn+ssh").is_ok());
        assert!(validate_protocol("").is_err());
        assert!(validate_protocol("ftp:").is_err());
        assert!(validate_protocol("http s").is_err());
    }

    #[test]
    fn test_invalid_proxy() {
        let mut config = test_config();
        config.http.proxy = Some("not a url".to_string());
        assert!(validate(&config).is_err());

        config.http.proxy = Some("http://proxy.local:3128".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut config = test_config();
        config.export.chunk_size = 0;
        assert!(validate(&config).is_err());

        let mut config = test_config();
        config.healthcheck.batch_size = 0;
        assert!(validate(&config).is_err());

        let mut config = test_config();
        config.healthcheck.query_size = 0;
        assert!(validate(&config).is_err());

        let mut config = test_config();
        config.http.timeout = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_max_links_means_unlimited() {
        let mut config = test_config();
        config.healthcheck.max_links = 0;
        config.export.max_links = 0;
        assert!(validate(&config).is_ok());
    }
}
