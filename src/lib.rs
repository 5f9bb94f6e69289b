//! Round-robin Layer-7 load balancer library.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::dispatcher ──▶ load_balancer::pool
//!                                           │                    (next_peer)
//!                                           ▼
//!                                   resilience::retries ──▶ Backend forwarder ──▶ upstream
//!                                   (retry / escalate)
//!
//!     health::active (periodic) ──▶ health::probe (TCP) ──▶ pool.mark_backend_status
//! ```

// Core subsystems
pub mod config;
pub mod http;

// Traffic management
pub mod health;
pub mod load_balancer;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::LbConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{backend::Backend, pool::BackendPool};
