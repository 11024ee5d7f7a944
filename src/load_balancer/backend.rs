//! Backend abstraction and registration.
//!
//! # Responsibilities
//! - Represent a single backend by its parsed address
//! - Validate configured address strings (all or nothing)
//! - Expand per-backend weights into the weighted sequence

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::error::EngineError;
use crate::load_balancer::Strategy;

/// A single backend server.
///
/// Two backends are the same backend iff their parsed addresses are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Backend {
    url: Url,
}

impl Backend {
    /// Parse and validate one configured address.
    pub fn parse(address: &str) -> Result<Self, EngineError> {
        let invalid = |reason: String| EngineError::InvalidAddress {
            address: address.to_string(),
            reason,
        };

        // Url::parse silently trims surrounding whitespace
        if address.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("contains whitespace or control characters".into()));
        }

        let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(Self { url }),
            _ => Err(invalid("missing host".into())),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Output of [`register`].
#[derive(Debug, Clone)]
pub struct Registration {
    /// Backends in configuration order.
    pub backends: Vec<Arc<Backend>>,
    /// Weight-expanded positions into `backends`, for the weighted strategy.
    pub weighted: Option<Vec<usize>>,
}

/// Validate and register the configured backends for `strategy`.
///
/// Fails without registering anything if any address is malformed.
pub fn register(
    addresses: &[String],
    weights: Option<&[u32]>,
    strategy: Strategy,
) -> Result<Registration, EngineError> {
    let backends = addresses
        .iter()
        .map(|address| Backend::parse(address).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;

    if strategy.requires_backends() && backends.is_empty() {
        return Err(EngineError::NoBackends(strategy));
    }

    let weighted = if strategy.is_weighted() {
        let weights = weights.ok_or_else(|| {
            EngineError::WeightMismatch(format!(
                "{} requires one weight per backend, none given",
                strategy
            ))
        })?;
        Some(expand_weights(backends.len(), weights)?)
    } else {
        None
    };

    Ok(Registration { backends, weighted })
}

/// Upper bound on the length of the expanded weighted sequence.
pub const MAX_WEIGHT_SUM: usize = 1 << 20;

/// Backend `i` appears `weights[i]` times, contiguously, in backend order.
pub fn expand_weights(backend_count: usize, weights: &[u32]) -> Result<Vec<usize>, EngineError> {
    if weights.len() != backend_count {
        return Err(EngineError::WeightMismatch(format!(
            "{} backends but {} weights",
            backend_count,
            weights.len()
        )));
    }
    if let Some(index) = weights.iter().position(|&w| w == 0) {
        return Err(EngineError::WeightMismatch(format!(
            "weight for backend {} must be at least 1",
            index
        )));
    }

    let total = weights.iter().map(|&w| u64::from(w)).sum::<u64>();
    if total > MAX_WEIGHT_SUM as u64 {
        return Err(EngineError::WeightMismatch(format!(
            "weights sum to {}, at most {} allowed",
            total, MAX_WEIGHT_SUM
        )));
    }

    let mut expanded = Vec::with_capacity(total as usize);
    for (position, &weight) in weights.iter().enumerate() {
        expanded.extend(std::iter::repeat(position).take(weight as usize));
    }
    Ok(expanded)
}
