//! Metrics collection.
//!
//! # Metrics
//! - `flashx_requests_total` (counter): dispatched requests by backend, outcome
//! - `flashx_forbidden_total` (counter): blacklisted requests refused
//! - `flashx_throttle_wait_seconds` (histogram): time spent waiting for a token
//! - `flashx_backend_in_flight` (gauge): current requests per backend
//!
//! Recorded through the `metrics` facade; the host installs the exporter.

use std::time::Duration;

pub fn record_request(backend: &str, outcome: &'static str) {
    metrics::counter!(
        "flashx_requests_total",
        "backend" => backend.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_forbidden() {
    metrics::counter!("flashx_forbidden_total").increment(1);
}

pub fn record_throttle_wait(waited: Duration) {
    metrics::histogram!("flashx_throttle_wait_seconds").record(waited.as_secs_f64());
}

pub fn record_in_flight(backend: &str, count: usize) {
    metrics::gauge!("flashx_backend_in_flight", "backend" => backend.to_string())
        .set(count as f64);
}
