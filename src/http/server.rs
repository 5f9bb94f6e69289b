//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request ID)
//! - Spawn the health monitor next to the server
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::LbConfig;
use crate::health::active::HealthMonitor;
use crate::http::dispatcher::Dispatcher;
use crate::http::request::{MakeRequestUuid, ProxyRequest};
use crate::http::response::ServedBy;
use crate::load_balancer::pool::BackendPool;
use crate::observability::metrics;
use crate::resilience::retries::RetryPolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub max_body_bytes: usize,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: LbConfig,
    pool: Arc<BackendPool>,
}

impl HttpServer {
    /// Create a server balancing over `pool`.
    pub fn new(config: LbConfig, pool: Arc<BackendPool>) -> Self {
        let state = AppState {
            dispatcher: Dispatcher::new(pool.clone(), RetryPolicy::from_config(&config.retries)),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(state);
        Self {
            router,
            config,
            pool,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.pool.len(),
            "Load Balancer started"
        );

        if self.config.health_check.enabled {
            let monitor = HealthMonitor::new(self.pool.clone(), self.config.health_check.clone());
            tokio::spawn(monitor.run(shutdown.resubscribe()));
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Buffers the request and hands it to the dispatcher.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();

    tracing::debug!(
        method = %method,
        path = %request.uri().path(),
        remote_addr = %remote_addr,
        "Proxying request"
    );

    let request = match ProxyRequest::buffer(request, remote_addr, state.max_body_bytes).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(remote_addr = %remote_addr, error = %e, "Rejecting request");
            let response = e.into_response();
            metrics::record_request(&method, response.status().as_u16(), None, start_time);
            return response;
        }
    };

    let response = state.dispatcher.dispatch(&request).await;
    let backend = response.extensions().get::<ServedBy>().map(|s| s.0.as_str());
    metrics::record_request(&method, response.status().as_u16(), backend, start_time);
    response
}
