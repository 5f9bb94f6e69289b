//! Request dispatch with retry and failover.
//!
//! # Responsibilities
//! - Pick the next live backend for every inbound request
//! - Retry the same backend on forwarding failure, within the retry budget
//! - Mark a backend dead once its budget is spent and fail over to another
//! - Answer 503 when the attempt budget is spent or no backend is alive

use std::sync::Arc;

use axum::response::Response;

use crate::http::request::ProxyRequest;
use crate::http::response::{service_unavailable, ServedBy};
use crate::load_balancer::{backend::Backend, pool::BackendPool};
use crate::observability::metrics;
use crate::resilience::retries::{Escalation, RetryPolicy, Step};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    pool: Arc<BackendPool>,
    policy: RetryPolicy,
}

impl Dispatcher {
    pub fn new(pool: Arc<BackendPool>, policy: RetryPolicy) -> Self {
        Self { pool, policy }
    }

    /// Entry point for a fresh request.
    pub async fn dispatch(&self, request: &ProxyRequest) -> Response {
        self.dispatch_with(request, Escalation::default()).await
    }

    /// Dispatch a request that may already have escalated past some backends.
    pub async fn dispatch_with(&self, request: &ProxyRequest, mut escalation: Escalation) -> Response {
        loop {
            if self.policy.exhausted(escalation) {
                tracing::warn!(
                    remote_addr = %request.remote_addr,
                    path = %request.path(),
                    attempts = escalation.attempts,
                    "Max attempts reached, terminating"
                );
                return service_unavailable();
            }

            let Some(peer) = self.pool.next_peer() else {
                tracing::warn!(
                    remote_addr = %request.remote_addr,
                    path = %request.path(),
                    "No live backend available"
                );
                return service_unavailable();
            };

            match self.deliver(&peer, request, escalation).await {
                Ok(mut response) => {
                    response.extensions_mut().insert(ServedBy(peer.host()));
                    return response;
                }
                Err(next) => {
                    self.pool.mark_backend_status(peer.url(), false);
                    metrics::record_escalation(&peer.host());
                    tracing::info!(
                        remote_addr = %request.remote_addr,
                        path = %request.path(),
                        backend = %peer.host(),
                        attempt = next.attempts,
                        "Backend marked dead, attempting another"
                    );
                    escalation = next;
                }
            }
        }
    }

    /// Forward to one backend, retrying in place.
    ///
    /// On failure returns the escalated record for the next backend.
    async fn deliver(
        &self,
        peer: &Backend,
        request: &ProxyRequest,
        mut escalation: Escalation,
    ) -> Result<Response, Escalation> {
        loop {
            let error = match peer.forward(request).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            tracing::warn!(
                request_id = %request.request_id(),
                remote_addr = %request.remote_addr,
                path = %request.path(),
                backend = %peer.host(),
                retry = escalation.retries,
                error = %error,
                "Forwarding failed"
            );

            match self.policy.on_failure(escalation) {
                Step::Retry { next, delay } => {
                    metrics::record_retry(&peer.host());
                    tokio::time::sleep(delay).await;
                    escalation = next;
                }
                Step::Escalate { next } => return Err(next),
            }
        }
    }
}
