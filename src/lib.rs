//! flashx: backend selection and admission control for HTTP forwarding.
//!
//! # Architecture Overview
//!
//! ```text
//!     inbound request
//!         │
//!         ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//!   │  rate_limit  │──▶│access_control│──▶│  load_balancer   │
//!   │  (throttle)  │   │ (blacklist)  │   │ strategy + guard │
//!   └──────────────┘   └──────────────┘   └────────┬─────────┘
//!                                                  │
//!                                                  ▼
//!                                         ┌──────────────────┐
//!     response ◀──────────────────────────│ forward (hyper)  │──▶ backend
//!                                         └──────────────────┘
//! ```
//!
//! The [`Engine`] owns everything above. It is configured once through
//! [`Engine::setup`] and then shared across request tasks.

pub mod config;
pub mod engine;
pub mod error;
pub mod forward;
pub mod http;
pub mod load_balancer;
pub mod observability;
pub mod security;

pub use config::schema::EngineConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::EngineError;
pub use load_balancer::Strategy;
