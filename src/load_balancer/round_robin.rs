//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, LoadBalancer};

/// Round-robin selector over live backends.
/// Stores a shared cursor that every request advances.
#[derive(Debug, Default)]
pub struct RoundRobin {
    current: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let len = backends.len();
        let next = self.current.fetch_add(1, Ordering::Relaxed).wrapping_add(1) % len;

        // One full lap at most, so an all-dead pool terminates.
        for offset in 0..len {
            let index = (next + offset) % len;
            let backend = &backends[index];
            if backend.is_alive() {
                if offset != 0 {
                    // Dead ones were skipped; continue the rotation after the pick.
                    self.current.store(index, Ordering::Relaxed);
                }
                return Some(backend.clone());
            }
        }
        None
    }
}
