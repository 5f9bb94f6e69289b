//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding failure on a backend:
//!     → retries.rs (retry same backend or escalate)
//!     → backoff.rs (delay before the next retry)
//! ```
//!
//! # Design Decisions
//! - Failures are handled as close to the backend as possible before widening
//! - Counters live in an explicit per-request value, never in shared state
//! - Fixed delay by default; exponential backoff is opt-in

pub mod backoff;
pub mod retries;
