use crate::config::types::{Config, CrawlDefaults, TransportConfig};
use crate::crawler::{DELAY_RANGE_MS, DEPTH_RANGE, TIMEOUT_RANGE_SECS};
use crate::ConfigError;
use reqwest::header::HeaderValue;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_transport_config(&config.transport)?;
    validate_crawl_defaults(&config.crawl)?;
    Ok(())
}

/// Validates transport configuration
fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    if config.max_connections < 1 || config.max_connections > 1000 {
        return Err(ConfigError::Validation(format!(
            "max-connections must be between 1 and 1000, got {}",
            config.max_connections
        )));
    }

    if config.max_connections_per_host < 1
        || config.max_connections_per_host > config.max_connections
    {
        return Err(ConfigError::Validation(format!(
            "max-connections-per-host must be between 1 and max-connections ({}), got {}",
            config.max_connections, config.max_connections_per_host
        )));
    }

    if !TIMEOUT_RANGE_SECS.contains(&config.timeout_secs) {
        return Err(ConfigError::Validation(format!(
            "transport timeout-secs must be between {} and {}, got {}",
            TIMEOUT_RANGE_SECS.start(),
            TIMEOUT_RANGE_SECS.end(),
            config.timeout_secs
        )));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    validate_header("user-agent", &config.user_agent)?;
    validate_header("accept", &config.accept)?;
    validate_header("accept-language", &config.accept_language)?;

    Ok(())
}

/// Validates defaults used to build crawl requests
fn validate_crawl_defaults(config: &CrawlDefaults) -> Result<(), ConfigError> {
    if !DEPTH_RANGE.contains(&config.depth) {
        return Err(ConfigError::Validation(format!(
            "crawl depth must be between {} and {}, got {}",
            DEPTH_RANGE.start(),
            DEPTH_RANGE.end(),
            config.depth
        )));
    }

    if !DELAY_RANGE_MS.contains(&config.delay_ms) {
        return Err(ConfigError::Validation(format!(
            "crawl delay-ms must be between {} and {}, got {}",
            DELAY_RANGE_MS.start(),
            DELAY_RANGE_MS.end(),
            config.delay_ms
        )));
    }

    if !TIMEOUT_RANGE_SECS.contains(&config.timeout_secs) {
        return Err(ConfigError::Validation(format!(
            "crawl timeout-secs must be between {} and {}, got {}",
            TIMEOUT_RANGE_SECS.start(),
            TIMEOUT_RANGE_SECS.end(),
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Header values must be non-empty and representable on the wire
fn validate_header(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if HeaderValue::from_str(value).is_err() {
        return Err(ConfigError::Validation(format!(
            "{} contains characters not allowed in an HTTP header: '{}'",
            name, value
        )));
    }

    Ok(())
}
