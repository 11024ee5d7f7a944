//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine, tracker, limiter produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms via `metrics`)
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or exporter on its own
//! - Request ID (UUID v4) is attached to the dispatch span

pub mod logging;
pub mod metrics;
