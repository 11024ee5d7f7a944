//! Forwarding seam.
//!
//! # Data Flow
//! ```text
//! Engine (backend chosen, guard held)
//!     → Forwarder::forward(backend, request, hooks)
//!         → point request at backend
//!         → RequestRewrite hook
//!         → transport (client.rs: hyper-util legacy client)
//!         → ResponseRewrite hook
//!     → response returned to the caller
//! ```
//!
//! # Design Decisions
//! - The engine never looks inside a Forwarder; any transport can be plugged in
//! - Hooks are applied by the forwarder, not by the engine
//! - No retries and no timeouts at this layer

pub mod client;
pub mod hooks;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use thiserror::Error;

use crate::load_balancer::Backend;

pub use client::HttpForwarder;
pub use hooks::{Hooks, RequestRewrite, ResponseRewrite};

/// Failure reported by a forwarding mechanism.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("cannot build upstream request: {0}")]
    InvalidRequest(String),

    #[error("response rewrite failed: {0}")]
    Rewrite(String),
}

/// Relays one request to one backend and returns its response.
#[async_trait]
pub trait Forwarder: Send + Sync {
    async fn forward(
        &self,
        backend: &Backend,
        request: Request<Body>,
        hooks: &Hooks,
    ) -> Result<Response<Body>, ForwardError>;
}
