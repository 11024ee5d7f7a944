//! Error types shared by setup and dispatch.

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::forward::ForwardError;
use crate::load_balancer::Strategy;

/// Errors produced by [`crate::Engine`].
///
/// `InvalidAddress`, `NoBackends` and `WeightMismatch` are setup errors and
/// leave the engine unconfigured. The rest are per-request outcomes.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid backend address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("strategy {0} requires at least one backend")]
    NoBackends(Strategy),

    #[error("weight mismatch: {0}")]
    WeightMismatch(String),

    #[error("remote address {0} is blacklisted")]
    Forbidden(String),

    #[error("forwarding failed: {0}")]
    Forwarding(#[from] ForwardError),

    #[error("engine is not configured")]
    NotConfigured,
}

impl EngineError {
    /// Whether this error came out of setup validation.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidAddress { .. }
                | EngineError::NoBackends(_)
                | EngineError::WeightMismatch(_)
        )
    }

    /// Status code written to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
            EngineError::Forwarding(_) => StatusCode::BAD_GATEWAY,
            EngineError::NoBackends(_) | EngineError::NotConfigured => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            EngineError::InvalidAddress { .. } | EngineError::WeightMismatch(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            EngineError::Forbidden(_) => "Forbidden",
            EngineError::Forwarding(_) => "Upstream request failed",
            EngineError::NoBackends(_) => "No backends configured",
            EngineError::NotConfigured => "Proxy not configured",
            _ => "Proxy misconfigured",
        };
        let mut response = Response::new(Body::from(message));
        *response.status_mut() = status;
        response
    }
}
