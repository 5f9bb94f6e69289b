//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the load
//! balancer. Values come from command-line flags (see `loader.rs`); every
//! section has defaults so tests can build a config field by field.

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Default)]
pub struct LbConfig {
    /// Listener configuration (port, body limit).
    pub listener: ListenerConfig,

    /// Upstream backends, in rotation order.
    pub backends: Vec<Url>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Retry and escalation settings.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Port to serve on (all interfaces).
    pub port: u16,

    /// Largest request body buffered for replay across retries.
    pub max_body_bytes: usize,
}

impl ListenerConfig {
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    /// Enable the periodic health monitor.
    pub enabled: bool,

    /// Health check interval in seconds.
    pub interval_secs: u64,

    /// TCP connect timeout per backend in seconds.
    pub timeout_secs: u64,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 120,
            timeout_secs: 2,
        }
    }
}

/// Shape of the delay between same-backend retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum BackoffKind {
    /// Constant delay of `base_delay_ms`.
    #[default]
    Fixed,
    /// Doubling delay from `base_delay_ms`, capped at `max_delay_ms`, with jitter.
    Exponential,
}

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Same-backend retries before the backend is marked dead.
    pub max_retries: u32,

    /// Distinct-backend escalations before the request fails with 503.
    pub max_attempts: u32,

    /// Delay policy between retries.
    pub backoff: BackoffKind,

    /// Base (or fixed) retry delay in milliseconds.
    pub base_delay_ms: u64,

    /// Cap for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_attempts: 3,
            backoff: BackoffKind::Fixed,
            base_delay_ms: 10,
            max_delay_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) when `RUST_LOG` is unset.
    pub log_level: String,

    /// Prometheus endpoint bind address; metrics are off when unset.
    pub metrics_address: Option<SocketAddr>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}
