//! Blocking token-bucket rate limiter.
//!
//! `acquire` suspends the calling task until a token is available. Waiters are
//! not queued: whichever task finds a token first proceeds.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// A simple token bucket.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    /// Take a token, or report how long until one is available.
    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> Result<(), Duration> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / refill_rate))
        }
    }
}

#[derive(Debug)]
struct Limit {
    rate: f64,
    capacity: f64,
    bucket: Mutex<TokenBucket>,
}

/// Engine-wide request rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    limit: Option<Limit>,
}

impl RateLimiter {
    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self { limit: None }
    }

    /// Allow `requests_per_second` sustained, with up to `burst` tokens
    /// saved while idle. A rate of zero means unlimited.
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        if requests_per_second == 0 {
            return Self::unlimited();
        }
        let capacity = burst.max(1) as f64;
        Self {
            limit: Some(Limit {
                rate: requests_per_second as f64,
                capacity,
                bucket: Mutex::new(TokenBucket::new(capacity)),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_second, config.burst_size)
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit.is_none()
    }

    /// Wait until a token is available, then consume it.
    pub async fn acquire(&self) {
        let Some(limit) = &self.limit else {
            return;
        };

        let started = Instant::now();
        loop {
            let wait = {
                let mut bucket = limit.bucket.lock().unwrap_or_else(PoisonError::into_inner);
                match bucket.try_acquire(limit.capacity, limit.rate) {
                    Ok(()) => break,
                    Err(wait) => wait,
                }
            };
            tokio::time::sleep(wait).await;
        }

        let waited = started.elapsed();
        if !waited.is_zero() {
            tracing::trace!(waited_ms = waited.as_millis() as u64, "Throttled request");
            metrics::record_throttle_wait(waited);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unlimited_never_blocks() {
        let limiter = RateLimiter::new(0, 0);
        assert!(limiter.is_unlimited());
        let start = std::time::Instant::now();
        for _ in 0..10_000 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sustained_rate() {
        let limiter = RateLimiter::new(10, 1);
        let start = Instant::now();
        for _ in 0..11 {
            limiter.acquire().await;
        }
        // first token is free, the next ten arrive every 100ms
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(990), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1100), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_immediate() {
        let limiter = RateLimiter::new(1, 5);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(10));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(990));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waiters_all_proceed() {
        let limiter = Arc::new(RateLimiter::new(20, 1));
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.acquire().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
