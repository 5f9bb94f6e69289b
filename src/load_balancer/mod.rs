//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher asks for a peer
//!     → pool.rs (ordered backends, liveness updates)
//!     → round_robin.rs (rotate through live backends)
//!     → backend.rs (forward through the backend's forwarder)
//! ```
//!
//! # Design Decisions
//! - Dead backends are skipped, never removed; they rejoin once marked alive
//! - The selection scan is bounded to one lap of the pool
//! - Liveness is a single atomic flag per backend

use std::sync::Arc;

use crate::load_balancer::backend::Backend;

pub mod backend;
pub mod pool;
pub mod round_robin;

/// Backend selection strategy.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Pick the next live backend, or `None` if every backend is dead.
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;
}
