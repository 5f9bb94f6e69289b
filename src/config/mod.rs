//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command-line flags
//!     → loader.rs (clap parse into Cli)
//!     → validation.rs (backend url parsing, semantic checks)
//!     → LbConfig (validated, immutable)
//!     → handed to startup, which builds the pool and server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the backend set is fixed at startup
//! - All fields have defaults to allow minimal invocations
//! - Any configuration error is fatal

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{Cli, ConfigError};
pub use schema::{BackoffKind, HealthCheckConfig, LbConfig, ListenerConfig, RetryConfig};
