//! Per-key token bucket rate limiting
//!
//! Buckets are created full on the first request for a key and dropped by a
//! lazy sweep once they have been idle for `bucket_max_age_secs`. A dropped key
//! simply starts over at full capacity.

mod bucket;

pub use bucket::TokenBucket;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Rate limit settings shared by every bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Burst size
    pub capacity: f64,

    /// Tokens added per second
    pub refill_per_sec: f64,

    /// Buckets idle for longer than this are forgotten
    pub bucket_max_age_secs: u64,

    /// Minimum spacing between two sweeps
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 10.0,
            refill_per_sec: 2.0,
            bucket_max_age_secs: 3600,
            sweep_interval_secs: 300,
        }
    }
}

#[derive(Debug)]
struct Buckets {
    by_key: HashMap<String, TokenBucket>,
    last_sweep: Instant,
}

/// Owns one token bucket per key
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Mutex<Buckets>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Mutex::new(Buckets {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Whether a request costing `cost` tokens may proceed for `key`
    pub async fn allow(&self, key: &str, cost: f64) -> bool {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;

        let sweep_interval = Duration::from_secs(self.config.sweep_interval_secs);
        if now.saturating_duration_since(buckets.last_sweep) >= sweep_interval {
            let max_age = Duration::from_secs(self.config.bucket_max_age_secs);
            Self::sweep_locked(&mut buckets, max_age, now);
        }

        let (capacity, refill) = (self.config.capacity, self.config.refill_per_sec);
        let allowed = buckets
            .by_key
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(capacity, refill, now))
            .try_consume(cost, now);

        if !allowed {
            debug!("Rate limited: {}", key);
        }

        allowed
    }

    /// Forget buckets untouched for longer than `max_age`; returns how many were dropped
    pub async fn sweep_stale(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().await;
        Self::sweep_locked(&mut buckets, max_age, now)
    }

    pub async fn len(&self) -> usize {
        self.buckets.lock().await.by_key.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn sweep_locked(buckets: &mut Buckets, max_age: Duration, now: Instant) -> usize {
        let before = buckets.by_key.len();
        buckets
            .by_key
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill()) <= max_age);
        buckets.last_sweep = now;

        let dropped = before - buckets.by_key.len();
        if dropped > 0 {
            debug!("Dropped {} stale rate limit buckets", dropped);
        }
        dropped
    }
}
