//! Retry and escalation policy.
//!
//! # Responsibilities
//! - Carry the per-request retry/attempt counters
//! - Decide between retrying the same backend and escalating to another one
//! - Decide when a request has run out of backends to try
//!
//! # State Machine
//! ```text
//! Forwarding(backend) ── ok ──▶ Done
//!        │
//!      error
//!        ▼
//! retries < max_retries ──▶ sleep(delay), Forwarding(same backend), retries + 1
//! otherwise             ──▶ mark backend dead, attempts + 1, retries = 0,
//!                           back to the dispatcher
//! dispatcher: attempts > max_attempts ──▶ 503
//! ```

use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::Backoff;

/// Per-request escalation record. Created zeroed at request entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Escalation {
    /// Retries spent on the current backend.
    pub retries: u32,
    /// Distinct backends already given up on.
    pub attempts: u32,
}

impl Escalation {
    /// One more retry on the same backend.
    pub fn retried(self) -> Self {
        Self {
            retries: self.retries + 1,
            ..self
        }
    }

    /// Move on to a fresh backend with a full retry budget.
    pub fn escalated(self) -> Self {
        Self {
            retries: 0,
            attempts: self.attempts + 1,
        }
    }
}

/// What to do after a forwarding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Wait `delay`, then forward to the same backend again.
    Retry { next: Escalation, delay: Duration },
    /// Mark the backend dead and select another one.
    Escalate { next: Escalation },
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            max_attempts: config.max_attempts,
            backoff: Backoff::from_config(config),
        }
    }

    pub fn on_failure(&self, current: Escalation) -> Step {
        if current.retries < self.max_retries {
            let next = current.retried();
            Step::Retry {
                next,
                delay: self.backoff.delay(next.retries),
            }
        } else {
            Step::Escalate {
                next: current.escalated(),
            }
        }
    }

    /// True once more than `max_attempts` backends have been given up on.
    pub fn exhausted(&self, current: Escalation) -> bool {
        current.attempts > self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
