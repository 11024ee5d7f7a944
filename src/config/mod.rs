//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or EngineConfig built in code
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Engine::setup (builds pool, limiter, blacklist)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Hooks and transports are code, not config; they live on EngineBuilder

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{EngineConfig, ObservabilityConfig, RateLimitConfig};
