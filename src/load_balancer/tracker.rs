//! In-flight request accounting.
//!
//! # Responsibilities
//! - Track active requests per distinct backend (for Least Connections LB)
//! - Hand out RAII guards that release the count on every exit path
//! - Provide consistent snapshots for operators and tests
//!
//! # Design Decisions
//! - One coarse lock per engine; the scan-then-increment of least-connections
//!   runs under it so concurrent picks cannot observe the same minimum
//! - Counters are stored in configuration order, which makes ties
//!   deterministic

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::load_balancer::backend::Backend;
use crate::observability::metrics;

/// Concurrency-safe mapping from backend to in-flight request count.
#[derive(Debug)]
pub struct ConnectionTracker {
    /// Distinct backends, by first appearance in configuration.
    backends: Vec<Arc<Backend>>,
    slots: HashMap<Arc<Backend>, usize>,
    counts: Mutex<Vec<usize>>,
}

impl ConnectionTracker {
    /// Create a tracker with one zeroed counter per distinct backend.
    pub fn new(backends: &[Arc<Backend>]) -> Self {
        let mut distinct = Vec::new();
        let mut slots = HashMap::new();
        for backend in backends {
            if !slots.contains_key(backend) {
                slots.insert(backend.clone(), distinct.len());
                distinct.push(backend.clone());
            }
        }
        let counts = Mutex::new(vec![0; distinct.len()]);
        Self {
            backends: distinct,
            slots,
            counts,
        }
    }

    /// Slot index for `backend`, if it is tracked.
    pub fn slot_of(&self, backend: &Backend) -> Option<usize> {
        self.slots.get(backend).copied()
    }

    /// Number of distinct backends tracked.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Count one more request against `backend`.
    /// Returns false if the backend is not tracked.
    pub fn increment(&self, backend: &Backend) -> bool {
        match self.slot_of(backend) {
            Some(slot) => {
                self.bump(&mut self.lock(), slot);
                true
            }
            None => false,
        }
    }

    /// Release one request from `backend`. Never goes below zero.
    pub fn decrement(&self, backend: &Backend) -> bool {
        match self.slot_of(backend) {
            Some(slot) => {
                self.release(slot);
                true
            }
            None => false,
        }
    }

    /// Current counts, in configuration order.
    pub fn snapshot(&self) -> Vec<(Arc<Backend>, usize)> {
        let counts = self.lock();
        self.backends
            .iter()
            .cloned()
            .zip(counts.iter().copied())
            .collect()
    }

    /// Current count for a single backend.
    pub fn count(&self, backend: &Backend) -> Option<usize> {
        let slot = self.slot_of(backend)?;
        Some(self.lock()[slot])
    }

    /// Increment `slot` and return a guard that releases it on drop.
    pub fn acquire(self: &Arc<Self>, slot: usize) -> Option<BackendGuard> {
        let backend = self.backends.get(slot)?.clone();
        self.bump(&mut self.lock(), slot);
        Some(BackendGuard {
            tracker: self.clone(),
            backend,
            slot,
        })
    }

    /// Pick the backend with the fewest in-flight requests and count it,
    /// under a single lock acquisition.
    ///
    /// Ties go to the backend configured first.
    pub fn acquire_least(self: &Arc<Self>) -> Option<BackendGuard> {
        let mut counts = self.lock();
        // min_by_key keeps the first of equal elements
        let slot = counts
            .iter()
            .enumerate()
            .min_by_key(|&(_, count)| *count)
            .map(|(slot, _)| slot)?;
        self.bump(&mut counts, slot);
        drop(counts);

        Some(BackendGuard {
            tracker: self.clone(),
            backend: self.backends[slot].clone(),
            slot,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<usize>> {
        // Counter updates cannot panic midway, so a poisoned value is still sound
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self, counts: &mut [usize], slot: usize) {
        counts[slot] += 1;
        metrics::record_in_flight(self.backends[slot].as_str(), counts[slot]);
    }

    fn release(&self, slot: usize) {
        let mut counts = self.lock();
        counts[slot] = counts[slot].saturating_sub(1);
        metrics::record_in_flight(self.backends[slot].as_str(), counts[slot]);
    }
}

/// A RAII guard that holds one in-flight count on its backend.
#[derive(Debug)]
pub struct BackendGuard {
    tracker: Arc<ConnectionTracker>,
    backend: Arc<Backend>,
    slot: usize,
}

impl BackendGuard {
    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }
}

impl Deref for BackendGuard {
    type Target = Backend;
    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for BackendGuard {
    fn drop(&mut self) {
        self.tracker.release(self.slot);
    }
}
