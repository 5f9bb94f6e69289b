//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (buffer body, keep client address)
//!     → dispatcher.rs (pick backend, retry, fail over)
//!     → forwarder.rs (rewrite URI, send upstream)
//!     → response.rs (strip hop-by-hop headers, 503 on exhaustion)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod forwarder;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use forwarder::{ForwardError, Forwarder, HttpForwarder};
pub use request::{MakeRequestUuid, ProxyRequest, X_REQUEST_ID};
pub use server::HttpServer;
