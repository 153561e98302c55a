use crate::config::types::{Config, ExchangeConfig, ExportConfig};
use crate::ConfigError;
use url::Url;

/// Longest accepted pacing delay between requests
const MAX_REQUEST_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_exchange_config(&config.exchange)?;
    validate_export_config(&config.export)?;
    Ok(())
}

/// Validates connection settings
fn validate_exchange_config(config: &ExchangeConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use HTTP or HTTPS, got '{}'",
            url.scheme()
        )));
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url cannot be used as a base: '{}'",
            config.base_url
        )));
    }

    if config.organization_id.trim().is_empty() {
        return Err(ConfigError::Missing("organization-id (ORGANIZATION_ID)"));
    }

    if config.client_id.as_deref().map_or(true, |v| v.trim().is_empty()) {
        return Err(ConfigError::Missing("client-id (CLIENT_ID)"));
    }

    if config.client_secret.as_deref().map_or(true, |v| v.trim().is_empty()) {
        return Err(ConfigError::Missing("client-secret (CLIENT_SECRET)"));
    }

    if config.search_limit < 1 {
        return Err(ConfigError::Validation(
            "search-limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates export settings
fn validate_export_config(config: &ExportConfig) -> Result<(), ConfigError> {
    if config.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    if config.request_delay_ms > MAX_REQUEST_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "request-delay-ms must be <= {}, got {}",
            MAX_REQUEST_DELAY_MS, config.request_delay_ms
        )));
    }

    Ok(())
}
