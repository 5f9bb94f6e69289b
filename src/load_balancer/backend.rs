//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track liveness (alive/dead)
//! - Own the forwarder that delivers requests to it

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::response::Response;
use url::Url;

use crate::http::forwarder::{ForwardError, Forwarder};
use crate::http::request::ProxyRequest;

/// A single upstream server.
#[derive(Debug)]
pub struct Backend {
    /// Upstream locator (scheme, host, port, base path).
    url: Url,
    /// Believed reachability. New backends start alive.
    alive: AtomicBool,
    forwarder: Arc<dyn Forwarder>,
}

impl Backend {
    /// Create a new backend, initially alive.
    pub fn new(url: Url, forwarder: Arc<dyn Forwarder>) -> Self {
        Self {
            url,
            alive: AtomicBool::new(true),
            forwarder,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `host:port` label used in logs and metrics.
    pub fn host(&self) -> String {
        match (self.url.host_str(), self.url.port_or_known_default()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => self.url.to_string(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Set liveness, returning the previous value.
    pub fn set_alive(&self, alive: bool) -> bool {
        self.alive.swap(alive, Ordering::AcqRel)
    }

    /// Deliver one request through this backend's forwarder.
    pub async fn forward(&self, request: &ProxyRequest) -> Result<Response, ForwardError> {
        self.forwarder.forward(request).await
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::forwarder::stub::StubForwarder;

    #[test]
    fn starts_alive_and_toggles() {
        let backend = Backend::new(
            Url::parse("http://127.0.0.1:8080").unwrap(),
            Arc::new(StubForwarder::ok("a")),
        );
        assert!(backend.is_alive());

        assert!(backend.set_alive(false));
        assert!(!backend.is_alive());

        assert!(!backend.set_alive(true));
        assert!(backend.is_alive());
    }

    #[test]
    fn host_label_uses_known_default_port() {
        let backend = Backend::new(
            Url::parse("http://example.com/api").unwrap(),
            Arc::new(StubForwarder::ok("a")),
        );
        assert_eq!(backend.host(), "example.com:80");
    }
}
