//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::load_balancer::{BackendGuard, BackendPool, LoadBalancer};

/// Shared rotation cursor.
///
/// Starts at -1 so the first advance yields index 0. Wraps through modular
/// arithmetic rather than resetting.
#[derive(Debug)]
pub struct Cursor(AtomicI64);

impl Cursor {
    pub fn new() -> Self {
        Self(AtomicI64::new(-1))
    }

    /// Advance the cursor and map it into `0..len`.
    pub fn next_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let current = self.0.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        Some(current.rem_euclid(len as i64) as usize)
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Round-robin selector.
/// Rotates through the BackendSet in configuration order.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Cursor,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, pool: &BackendPool) -> Option<BackendGuard> {
        let index = self.cursor.next_index(pool.len())?;
        pool.acquire(index)
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}
