//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the backend pool from the configured urls
//! - Start the metrics exporter when configured
//! - Bind the listener and run the server until a signal arrives

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use url::Url;

use crate::config::LbConfig;
use crate::http::forwarder::{build_client, HttpForwarder};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::load_balancer::{backend::Backend, pool::BackendPool};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// One backend per url, each with its own forwarder over a shared client.
pub fn build_pool(backends: &[Url]) -> BackendPool {
    let client = build_client();
    let mut pool = BackendPool::new();

    for url in backends {
        let forwarder = Arc::new(HttpForwarder::new(url.clone(), client.clone()));
        pool.add_backend(Backend::new(url.clone(), forwarder));
        tracing::info!(url = %url, "Configured server");
    }
    pool
}

/// Run the load balancer until SIGINT/SIGTERM.
pub async fn run(config: LbConfig) -> Result<(), StartupError> {
    if let Some(addr) = config.observability.metrics_address {
        metrics::init_metrics(addr);
    }

    let pool = Arc::new(build_pool(&config.backends));

    let addr = config.listener.bind_address();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    HttpServer::new(config, pool).run(listener, server_shutdown).await?;
    Ok(())
}
