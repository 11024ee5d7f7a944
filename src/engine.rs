//! Request dispatch.
//!
//! # Responsibilities
//! - Build the configured state from an [`EngineConfig`] (setup)
//! - Run the admission gate, select a backend, forward, release
//! - Let callers bypass selection with an explicit backend
//!
//! # Design Decisions
//! - Configured state is swapped in whole; a failed setup leaves the engine
//!   unconfigured, and in-flight requests keep the state they started with
//! - The in-flight count is held by a guard, so it is released on success,
//!   error, panic and cancellation alike
//! - Per-request errors never poison the engine

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::body::Body;
use axum::http::{Request, Response};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::forward::{Forwarder, Hooks, HttpForwarder, RequestRewrite, ResponseRewrite};
use crate::load_balancer::{Backend, BackendPool, LoadBalancer, Strategy};
use crate::observability::metrics;
use crate::security::{Admission, Blacklist, RateLimiter};

/// Everything setup produces. Immutable apart from the interior counters.
struct Configured {
    strategy: Strategy,
    pool: BackendPool,
    balancer: Box<dyn LoadBalancer>,
    limiter: RateLimiter,
    blacklist: Blacklist,
}

impl Configured {
    fn build(config: &EngineConfig) -> Result<Self, EngineError> {
        let pool = BackendPool::from_config(
            &config.backends,
            config.weights.as_deref(),
            config.strategy,
        )?;

        Ok(Self {
            strategy: config.strategy,
            pool,
            balancer: config.strategy.build(),
            limiter: RateLimiter::from_config(&config.rate_limit),
            blacklist: Blacklist::new(config.blacklist.iter().cloned()),
        })
    }

    async fn admit(&self, remote_addr: &str) -> Result<(), EngineError> {
        self.limiter.acquire().await;

        if self.blacklist.admit(remote_addr) == Admission::Forbidden {
            tracing::warn!(remote = %remote_addr, "Blacklisted remote address refused");
            metrics::record_forbidden();
            return Err(EngineError::Forbidden(remote_addr.to_string()));
        }
        Ok(())
    }
}

/// Backend selection and admission control in front of a [`Forwarder`].
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct Engine {
    state: ArcSwapOption<Configured>,
    forwarder: Arc<dyn Forwarder>,
    hooks: Hooks,
}

impl Engine {
    /// An unconfigured engine using [`HttpForwarder`] and no hooks.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Validate `config` and replace any previous configuration with it.
    ///
    /// On error the engine is left unconfigured and refuses to dispatch.
    pub fn setup(&self, config: &EngineConfig) -> Result<(), EngineError> {
        match Configured::build(config) {
            Ok(configured) => {
                tracing::info!(
                    strategy = %configured.strategy,
                    backends = configured.pool.len(),
                    requests_per_second = config.rate_limit.requests_per_second,
                    blacklisted = configured.blacklist.len(),
                    "Engine configured"
                );
                self.state.store(Some(Arc::new(configured)));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Engine setup failed");
                self.state.store(None);
                Err(e)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.state.load().is_some()
    }

    /// Strategy of the current configuration.
    pub fn strategy(&self) -> Option<Strategy> {
        self.state.load().as_ref().map(|s| s.strategy)
    }

    /// Registered backends, in configuration order.
    pub fn backends(&self) -> Option<Vec<Arc<Backend>>> {
        self.state.load().as_ref().map(|s| s.pool.backends().to_vec())
    }

    /// In-flight request counts per distinct backend.
    pub fn snapshot(&self) -> Option<Vec<(Arc<Backend>, usize)>> {
        self.state.load().as_ref().map(|s| s.pool.tracker().snapshot())
    }

    /// Throttle, admit, select a backend and forward `request` to it.
    ///
    /// `remote_addr` is matched literally against the blacklist.
    pub async fn dispatch(
        &self,
        remote_addr: &str,
        request: Request<Body>,
    ) -> Result<Response<Body>, EngineError> {
        let state = self.state.load_full().ok_or(EngineError::NotConfigured)?;
        let span = tracing::debug_span!(
            "dispatch",
            request_id = %Uuid::new_v4(),
            strategy = %state.strategy,
            backend = tracing::field::Empty,
        );

        async move {
            state.admit(remote_addr).await?;

            let guard = state
                .balancer
                .next_server(&state.pool)
                .ok_or(EngineError::NoBackends(state.strategy))?;
            tracing::Span::current().record("backend", guard.as_str());
            tracing::debug!(method = %request.method(), uri = %request.uri(), "Selected backend");

            // guard releases the in-flight count when this scope ends
            self.forward(&guard, request).await
        }
        .instrument(span)
        .await
    }

    /// Throttle, admit and forward `request` to `backend`, skipping selection
    /// and connection accounting.
    pub async fn dispatch_to(
        &self,
        remote_addr: &str,
        request: Request<Body>,
        backend: &Backend,
    ) -> Result<Response<Body>, EngineError> {
        let state = self.state.load_full().ok_or(EngineError::NotConfigured)?;
        let span = tracing::debug_span!(
            "dispatch_to",
            request_id = %Uuid::new_v4(),
            backend = %backend,
        );

        async move {
            state.admit(remote_addr).await?;
            self.forward(backend, request).await
        }
        .instrument(span)
        .await
    }

    async fn forward(
        &self,
        backend: &Backend,
        request: Request<Body>,
    ) -> Result<Response<Body>, EngineError> {
        match self.forwarder.forward(backend, request, &self.hooks).await {
            Ok(response) => {
                tracing::debug!(status = %response.status(), "Forwarded");
                metrics::record_request(backend.as_str(), "forwarded");
                Ok(response)
            }
            Err(e) => {
                tracing::error!(error = %e, "Upstream error");
                metrics::record_request(backend.as_str(), "failed");
                Err(EngineError::Forwarding(e))
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the parts of an [`Engine`] that are code rather than config.
#[derive(Default)]
pub struct EngineBuilder {
    forwarder: Option<Arc<dyn Forwarder>>,
    hooks: Hooks,
}

impl EngineBuilder {
    /// Replace the default [`HttpForwarder`].
    pub fn forwarder(mut self, forwarder: Arc<dyn Forwarder>) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    pub fn request_rewrite(mut self, hook: Arc<dyn RequestRewrite>) -> Self {
        self.hooks.request = Some(hook);
        self
    }

    pub fn response_rewrite(mut self, hook: Arc<dyn ResponseRewrite>) -> Self {
        self.hooks.response = Some(hook);
        self
    }

    /// Build an unconfigured engine.
    pub fn build(self) -> Engine {
        Engine {
            state: ArcSwapOption::empty(),
            forwarder: self
                .forwarder
                .unwrap_or_else(|| Arc::new(HttpForwarder::new())),
            hooks: self.hooks,
        }
    }

    /// Build and set up in one step.
    pub fn setup(self, config: &EngineConfig) -> Result<Engine, EngineError> {
        let engine = self.build();
        engine.setup(config)?;
        Ok(engine)
    }
}
