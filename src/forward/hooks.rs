//! Caller-supplied request and response rewrite hooks.

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};

use crate::forward::ForwardError;
use crate::load_balancer::Backend;

/// Mutates the outbound request after it has been pointed at `backend`.
pub trait RequestRewrite: Send + Sync {
    fn rewrite(&self, request: &mut Request<Body>, backend: &Backend);
}

impl<F> RequestRewrite for F
where
    F: Fn(&mut Request<Body>, &Backend) + Send + Sync,
{
    fn rewrite(&self, request: &mut Request<Body>, backend: &Backend) {
        self(request, backend)
    }
}

/// Mutates the backend response before it reaches the client.
/// An error turns the exchange into a forwarding failure.
pub trait ResponseRewrite: Send + Sync {
    fn rewrite(&self, response: &mut Response<Body>) -> Result<(), ForwardError>;
}

impl<F> ResponseRewrite for F
where
    F: Fn(&mut Response<Body>) -> Result<(), ForwardError> + Send + Sync,
{
    fn rewrite(&self, response: &mut Response<Body>) -> Result<(), ForwardError> {
        self(response)
    }
}

/// The optional hooks handed to every forward call.
#[derive(Clone, Default)]
pub struct Hooks {
    pub request: Option<Arc<dyn RequestRewrite>>,
    pub response: Option<Arc<dyn ResponseRewrite>>,
}

impl Hooks {
    pub fn apply_request(&self, request: &mut Request<Body>, backend: &Backend) {
        if let Some(hook) = &self.request {
            hook.rewrite(request, backend);
        }
    }

    pub fn apply_response(&self, response: &mut Response<Body>) -> Result<(), ForwardError> {
        match &self.response {
            Some(hook) => hook.rewrite(response),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("request", &self.request.is_some())
            .field("response", &self.response.is_some())
            .finish()
    }
}
