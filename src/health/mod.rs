//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe each backend (probe.rs, TCP connect)
//!     → pool.mark_backend_status
//!
//! Passive marking happens on the request path:
//!     Retry budget spent on a backend
//!     → dispatcher marks it dead
//!     → next probe may bring it back
//! ```
//!
//! # Design Decisions
//! - Reachability only: a TCP accept counts as healthy
//! - No hysteresis: one probe result sets the flag
//! - Backends are probed sequentially within a cycle

pub mod active;
pub mod probe;
