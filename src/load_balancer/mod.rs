//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! EngineConfig.backends (+ weights)
//!     → backend.rs (parse & validate, expand weights)
//!     → pool.rs (BackendSet + WeightedBackendSet + tracker)
//!
//! Per request:
//!     → Apply load balancing algorithm:
//!         - single.rs (always the first backend)
//!         - round_robin.rs (rotate through backends)
//!         - weighted.rs (rotate through the weight-expanded sequence)
//!         - least_conn.rs (pick backend with fewest in-flight requests)
//!     → tracker.rs (guard holds the in-flight count until dropped)
//! ```
//!
//! # Design Decisions
//! - The pool is immutable after setup; only the cursor and counters change
//! - Selection and increment happen together, through the returned guard
//! - Backends are keyed by parsed address, so duplicates share one counter

pub mod backend;
pub mod least_conn;
pub mod pool;
pub mod round_robin;
pub mod single;
pub mod tracker;
pub mod weighted;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use backend::Backend;
pub use pool::BackendPool;
pub use tracker::{BackendGuard, ConnectionTracker};

use least_conn::LeastConnections;
use round_robin::RoundRobin;
use single::Single;
use weighted::WeightedRoundRobin;

/// A backend selection algorithm.
///
/// Implementations return a guard that already counts the selected backend as
/// in flight. `None` only when the pool is empty.
pub trait LoadBalancer: Send + Sync + fmt::Debug {
    fn next_server(&self, pool: &BackendPool) -> Option<BackendGuard>;

    fn name(&self) -> &'static str;
}

/// Configured load balancing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// No balancing: every request goes to the first backend.
    #[default]
    None,
    RoundRobin,
    WeightedRoundRobin,
    LeastConnections,
}

impl Strategy {
    /// Every strategy except `None` refuses an empty backend list.
    pub fn requires_backends(self) -> bool {
        !matches!(self, Strategy::None)
    }

    pub fn is_weighted(self) -> bool {
        matches!(self, Strategy::WeightedRoundRobin)
    }

    /// Instantiate a fresh selector with its own cursor state.
    pub fn build(self) -> Box<dyn LoadBalancer> {
        match self {
            Strategy::None => Box::new(Single),
            Strategy::RoundRobin => Box::new(RoundRobin::new()),
            Strategy::WeightedRoundRobin => Box::new(WeightedRoundRobin::new()),
            Strategy::LeastConnections => Box::new(LeastConnections::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::None => "none",
            Strategy::RoundRobin => "round_robin",
            Strategy::WeightedRoundRobin => "weighted_round_robin",
            Strategy::LeastConnections => "least_connections",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names_match_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            strategy: Strategy,
        }

        for strategy in [
            Strategy::None,
            Strategy::RoundRobin,
            Strategy::WeightedRoundRobin,
            Strategy::LeastConnections,
        ] {
            let parsed: Wrapper = toml::from_str(&format!("strategy = \"{}\"", strategy)).unwrap();
            assert_eq!(parsed.strategy, strategy);
            assert_eq!(strategy.build().name(), strategy.as_str());
        }
    }

    #[test]
    fn test_requires_backends() {
        assert!(!Strategy::None.requires_backends());
        assert!(Strategy::RoundRobin.requires_backends());
        assert!(Strategy::LeastConnections.requires_backends());
        assert!(Strategy::WeightedRoundRobin.is_weighted());
    }
}
