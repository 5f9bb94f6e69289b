//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): requests by method, status and serving backend (`none` if no backend answered)
//! - `lb_request_duration_seconds` (histogram): end-to-end latency
//! - `lb_forward_retries_total` (counter): same-backend retries by backend
//! - `lb_backend_escalations_total` (counter): backends marked dead by the request path
//! - `lb_backend_alive` (gauge): 1=alive, 0=dead

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, backend: Option<&str>, start: Instant) {
    counter!(
        "lb_requests_total",
        "method" => method.to_owned(),
        "status" => status.to_string(),
        "backend" => backend.unwrap_or("none").to_owned()
    )
    .increment(1);
    histogram!("lb_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_retry(backend: &str) {
    counter!("lb_forward_retries_total", "backend" => backend.to_owned()).increment(1);
}

pub fn record_escalation(backend: &str) {
    counter!("lb_backend_escalations_total", "backend" => backend.to_owned()).increment(1);
}

pub fn record_backend_alive(backend: &str, alive: bool) {
    gauge!("lb_backend_alive", "backend" => backend.to_owned()).set(if alive { 1.0 } else { 0.0 });
}
