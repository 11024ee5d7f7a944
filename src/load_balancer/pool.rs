//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the BackendSet and WeightedBackendSet built at setup
//! - Map configuration positions onto tracker slots
//! - Provide connection guards for tracking

use std::sync::Arc;

use crate::error::EngineError;
use crate::load_balancer::{
    backend::{register, Backend, Registration},
    tracker::{BackendGuard, ConnectionTracker},
    Strategy,
};

/// Registered backends plus their shared connection tracker.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    weighted: Vec<usize>,
    /// Position in `backends` -> tracker slot.
    slots: Vec<usize>,
    tracker: Arc<ConnectionTracker>,
}

impl BackendPool {
    /// Validate the configured addresses and build the pool.
    pub fn from_config(
        addresses: &[String],
        weights: Option<&[u32]>,
        strategy: Strategy,
    ) -> Result<Self, EngineError> {
        register(addresses, weights, strategy).map(Self::new)
    }

    pub fn new(registration: Registration) -> Self {
        let Registration { backends, weighted } = registration;
        let tracker = Arc::new(ConnectionTracker::new(&backends));
        let slots = backends
            .iter()
            .filter_map(|b| tracker.slot_of(b))
            .collect();

        Self {
            backends,
            weighted: weighted.unwrap_or_default(),
            slots,
            tracker,
        }
    }

    /// BackendSet, in configuration order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// WeightedBackendSet as positions into [`Self::backends`].
    pub fn weighted(&self) -> &[usize] {
        &self.weighted
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn tracker(&self) -> &Arc<ConnectionTracker> {
        &self.tracker
    }

    /// Count the backend at `position` as in flight.
    pub fn acquire(&self, position: usize) -> Option<BackendGuard> {
        let slot = *self.slots.get(position)?;
        self.tracker.acquire(slot)
    }

    /// Count the least loaded backend as in flight.
    pub fn acquire_least(&self) -> Option<BackendGuard> {
        self.tracker.acquire_least()
    }
}
