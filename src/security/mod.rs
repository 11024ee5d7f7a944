//! Admission gate.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (wait for a token)
//!     → access_control.rs (refuse blacklisted remote addresses)
//!     → Pass to backend selection
//! ```
//!
//! # Design Decisions
//! - Throttling suspends only the waiting task
//! - Fail closed: a blacklisted caller is never forwarded

pub mod access_control;
pub mod rate_limit;

pub use access_control::{Admission, Blacklist};
pub use rate_limit::RateLimiter;
