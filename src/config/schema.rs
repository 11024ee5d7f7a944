//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::load_balancer::Strategy;

/// Root configuration for an engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Backend addresses (e.g., "http://127.0.0.1:3000"), in rotation order.
    pub backends: Vec<String>,

    /// Per-backend weights, same order as `backends`.
    /// Required with the weighted round-robin strategy, ignored otherwise.
    pub weights: Option<Vec<u32>>,

    /// Load balancing strategy.
    pub strategy: Strategy,

    /// Remote addresses refused with 403 (exact match).
    pub blacklist: Vec<String>,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl EngineConfig {
    /// Configuration for `backends` with the given strategy and nothing else.
    pub fn with_backends<I, S>(strategy: Strategy, backends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            backends: backends.into_iter().map(Into::into).collect(),
            strategy,
            ..Self::default()
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum sustained requests per second across the engine. 0 = unlimited.
    pub requests_per_second: u32,

    /// Tokens that may accumulate while idle.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 0,
            burst_size: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
