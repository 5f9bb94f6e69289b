//! Configuration loading from command-line flags.

use std::net::SocketAddr;

use clap::Parser;
use thiserror::Error;

use crate::config::schema::{
    BackoffKind, HealthCheckConfig, LbConfig, ListenerConfig, ObservabilityConfig, RetryConfig,
};
use crate::config::validation::{parse_backends, validate_config};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Please provide one or more backends to load balance")]
    NoBackends,

    #[error("Invalid backend url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Backend url '{0}' has no host")]
    MissingHost(String),

    #[error("Backend url '{url}' uses unsupported scheme '{scheme}' (only http is forwarded)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}

#[derive(Debug, Parser)]
#[command(name = "round-robin-lb")]
#[command(about = "Round-robin HTTP load balancer with health checks and failover", long_about = None)]
pub struct Cli {
    /// Load balanced backends, use commas to separate
    #[arg(long, default_value = "")]
    pub backends: String,

    /// Port to serve
    #[arg(long, default_value_t = 3030)]
    pub port: u16,

    /// Seconds between health check cycles
    #[arg(long, default_value_t = 120)]
    pub health_interval_secs: u64,

    /// TCP connect timeout for each health probe, in seconds
    #[arg(long, default_value_t = 2)]
    pub health_timeout_secs: u64,

    /// Disable the periodic health monitor
    #[arg(long)]
    pub disable_health_check: bool,

    /// Retries against the same backend before it is marked dead
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Different backends tried before answering 503
    #[arg(long, default_value_t = 3)]
    pub max_attempts: u32,

    /// Delay policy between retries
    #[arg(long, value_enum, default_value_t = BackoffKind::Fixed)]
    pub retry_backoff: BackoffKind,

    /// Retry delay (base delay for exponential backoff), in milliseconds
    #[arg(long, default_value_t = 10)]
    pub retry_delay_ms: u64,

    /// Exponential backoff cap, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub retry_max_delay_ms: u64,

    /// Largest request body buffered for retries, in bytes
    #[arg(long, default_value_t = 2 * 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    pub metrics_address: Option<SocketAddr>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Build and validate the runtime configuration.
    pub fn into_config(self) -> Result<LbConfig, ConfigError> {
        let config = LbConfig {
            listener: ListenerConfig {
                port: self.port,
                max_body_bytes: self.max_body_bytes,
            },
            backends: parse_backends(&self.backends)?,
            health_check: HealthCheckConfig {
                enabled: !self.disable_health_check,
                interval_secs: self.health_interval_secs,
                timeout_secs: self.health_timeout_secs,
            },
            retries: RetryConfig {
                max_retries: self.max_retries,
                max_attempts: self.max_attempts,
                backoff: self.retry_backoff,
                base_delay_ms: self.retry_delay_ms,
                max_delay_ms: self.retry_max_delay_ms,
            },
            observability: ObservabilityConfig {
                log_level: self.log_level,
                metrics_address: self.metrics_address,
            },
        };

        validate_config(&config)?;
        Ok(config)
    }
}
