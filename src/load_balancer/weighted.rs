//! Weighted round-robin load balancing strategy.
//!
//! Walks the weight-expanded sequence, so a backend of weight 3 is picked
//! three times in a row each cycle.

use crate::load_balancer::{round_robin::Cursor, BackendGuard, BackendPool, LoadBalancer};

#[derive(Debug, Default)]
pub struct WeightedRoundRobin {
    cursor: Cursor,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for WeightedRoundRobin {
    fn next_server(&self, pool: &BackendPool) -> Option<BackendGuard> {
        let weighted = pool.weighted();
        let index = self.cursor.next_index(weighted.len())?;
        pool.acquire(weighted[index])
    }

    fn name(&self) -> &'static str {
        "weighted_round_robin"
    }
}
