//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the ordered set of backends configured at startup
//! - Apply the load balancing algorithm to select a live backend
//! - Update liveness from health checks and forwarding failures

use std::sync::Arc;

use url::Url;

use crate::health::probe::Prober;
use crate::load_balancer::{backend::Backend, round_robin::RoundRobin, LoadBalancer};
use crate::observability::metrics;

/// Ordered collection of backends shared by the dispatcher and health monitor.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    balancer: Box<dyn LoadBalancer>,
}

impl BackendPool {
    /// Create an empty round-robin pool.
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
            balancer: Box::new(RoundRobin::new()),
        }
    }

    /// Append a backend. Only used while the pool is being configured.
    pub fn add_backend(&mut self, backend: Backend) {
        metrics::record_backend_alive(&backend.host(), backend.is_alive());
        self.backends.push(Arc::new(backend));
    }

    /// Set the liveness of the backend with the given url.
    ///
    /// Returns `false` if no backend matches; nothing is changed in that case.
    pub fn mark_backend_status(&self, url: &Url, alive: bool) -> bool {
        let Some(backend) = self.backends.iter().find(|b| b.url() == url) else {
            tracing::debug!(url = %url, "Backend not in pool, status unchanged");
            return false;
        };

        let was_alive = backend.set_alive(alive);
        if was_alive != alive {
            tracing::info!(backend = %backend.host(), alive, "Backend status changed");
        }
        metrics::record_backend_alive(&backend.host(), alive);
        true
    }

    /// Select the next live backend in round-robin order.
    pub fn next_peer(&self) -> Option<Arc<Backend>> {
        let peer = self.balancer.next_server(&self.backends);
        if peer.is_none() {
            tracing::debug!(backend_count = self.backends.len(), "No live backends in pool");
        }
        peer
    }

    /// Probe every backend in order and record the result.
    pub async fn health_check(&self, prober: &dyn Prober) {
        for backend in &self.backends {
            let alive = prober.is_reachable(backend.url()).await;
            self.mark_backend_status(backend.url(), alive);
            tracing::info!(
                backend = %backend.url(),
                status = if alive { "up" } else { "down" },
                "Backend checked"
            );
        }
    }

    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Number of backends currently believed alive.
    pub fn alive_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_alive()).count()
    }
}

impl Default for BackendPool {
    fn default() -> Self {
        Self::new()
    }
}
