//! Configuration validation.
//!
//! # Responsibilities
//! - Parse the comma-separated backend list into urls
//! - Reject urls the forwarder cannot serve (no host, non-http scheme)
//! - Validate value ranges (timeouts and intervals > 0)
//!
//! # Design Decisions
//! - Range checks return all errors, not just the first
//! - Any error is fatal at startup

use url::Url;

use crate::config::loader::ConfigError;
use crate::config::schema::{BackoffKind, LbConfig};

/// Parse `http://a:80,http://b:80` into backend urls.
///
/// Surrounding whitespace and empty segments (e.g. a trailing comma) are ignored.
pub fn parse_backends(list: &str) -> Result<Vec<Url>, ConfigError> {
    let mut backends = Vec::new();

    for raw in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;

        if url.scheme() != "http" {
            return Err(ConfigError::UnsupportedScheme {
                url: raw.to_string(),
                scheme: url.scheme().to_string(),
            });
        }
        if url.host_str().is_none() {
            return Err(ConfigError::MissingHost(raw.to_string()));
        }

        backends.push(url);
    }

    if backends.is_empty() {
        return Err(ConfigError::NoBackends);
    }
    Ok(backends)
}

/// Semantic checks on an assembled config.
pub fn validate_config(config: &LbConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        return Err(ConfigError::NoBackends);
    }
    if config.health_check.interval_secs == 0 {
        errors.push("health check interval must be greater than 0".to_string());
    }
    if config.health_check.timeout_secs == 0 {
        errors.push("health check timeout must be greater than 0".to_string());
    }
    if config.retries.backoff == BackoffKind::Exponential
        && config.retries.max_delay_ms < config.retries.base_delay_ms
    {
        errors.push("retry max delay must not be below the base delay".to_string());
    }
    if config.listener.max_body_bytes == 0 {
        errors.push("max body size must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors))
    }
}
