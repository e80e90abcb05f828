// Tests for the per-key token bucket limiter

use captions_notes::{RateLimitConfig, RateLimiter};
use std::time::Duration;
use tokio::time::advance;

fn limiter(capacity: f64, refill_per_sec: f64) -> RateLimiter {
    RateLimiter::new(RateLimitConfig {
        capacity,
        refill_per_sec,
        ..RateLimitConfig::default()
    })
}

#[tokio::test(start_paused = true)]
async fn test_refill_after_drain_allows_exactly_rate_times_elapsed() {
    let limiter = limiter(10.0, 2.0);

    for _ in 0..10 {
        assert!(limiter.allow("s1", 1.0).await);
    }
    assert!(!limiter.allow("s1", 1.0).await);

    advance(Duration::from_secs(1)).await;

    assert!(limiter.allow("s1", 1.0).await);
    assert!(limiter.allow("s1", 1.0).await);
    assert!(!limiter.allow("s1", 1.0).await, "only 2 tokens refill in 1s");
}

#[tokio::test(start_paused = true)]
async fn test_keys_are_independent() {
    let limiter = limiter(2.0, 0.5);

    assert!(limiter.allow("a", 1.0).await);
    assert!(limiter.allow("a", 1.0).await);
    assert!(!limiter.allow("a", 1.0).await);

    assert!(limiter.allow("b", 1.0).await);
    assert_eq!(limiter.len().await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_cost_larger_than_tokens_is_denied_without_spending() {
    let limiter = limiter(3.0, 1.0);

    assert!(!limiter.allow("s1", 5.0).await);
    // The failed attempt left the bucket full
    assert!(limiter.allow("s1", 3.0).await);
}

#[tokio::test(start_paused = true)]
async fn test_refill_is_capped_at_capacity() {
    let limiter = limiter(3.0, 1.0);
    assert!(limiter.allow("s1", 3.0).await);

    advance(Duration::from_secs(3600)).await;

    assert!(limiter.allow("s1", 3.0).await);
    assert!(!limiter.allow("s1", 1.0).await);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_drops_only_stale_buckets() {
    let limiter = limiter(10.0, 2.0);
    limiter.allow("old", 1.0).await;

    advance(Duration::from_secs(100)).await;
    limiter.allow("fresh", 1.0).await;

    assert_eq!(limiter.sweep_stale(Duration::from_secs(60)).await, 1);
    assert_eq!(limiter.len().await, 1);

    // A swept key starts over at full capacity
    for _ in 0..10 {
        assert!(limiter.allow("old", 1.0).await);
    }
}

#[tokio::test(start_paused = true)]
async fn test_lazy_sweep_runs_on_allow() {
    let limiter = RateLimiter::new(RateLimitConfig {
        bucket_max_age_secs: 60,
        sweep_interval_secs: 30,
        ..RateLimitConfig::default()
    });
    limiter.allow("idle", 1.0).await;

    advance(Duration::from_secs(120)).await;
    limiter.allow("busy", 1.0).await;

    assert_eq!(limiter.len().await, 1);
}
