//! Per-provider rate limiting
//!
//! Three gates, applied in order for every call:
//! 1. Concurrency: a FIFO semaphore caps in-flight requests
//! 2. Spacing: governor enforces the minimum delay between request starts
//! 3. Burst: a sliding window caps requests per `burst_window`
//!
//! The returned permit holds the concurrency slot until dropped.

use super::ProviderError;
use governor::{Quota, RateLimiter};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::debug;

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Limits declared by a provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitPolicy {
    pub max_concurrent: usize,
    /// Minimum gap between request starts (zero disables spacing)
    pub min_delay: Duration,
    /// Requests allowed per `burst_window` (zero disables the window)
    pub burst_limit: usize,
    pub burst_window: Duration,
}

impl RateLimitPolicy {
    pub const fn new(
        max_concurrent: usize,
        min_delay: Duration,
        burst_limit: usize,
        burst_window: Duration,
    ) -> Self {
        Self {
            max_concurrent,
            min_delay,
            burst_limit,
            burst_window,
        }
    }

    /// No spacing or burst limits; concurrency still bounded
    pub const fn unlimited() -> Self {
        Self::new(64, Duration::ZERO, 0, Duration::ZERO)
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(4, Duration::from_millis(100), 20, Duration::from_secs(10))
    }
}

/// Held while a provider call is in flight
pub struct RateLimitPermit {
    _permit: OwnedSemaphorePermit,
}

pub struct ProviderRateLimiter {
    provider: String,
    policy: RateLimitPolicy,
    semaphore: Arc<Semaphore>,
    spacing: Option<DirectLimiter>,
    burst: Mutex<VecDeque<Instant>>,
}

impl ProviderRateLimiter {
    pub fn new(provider: impl Into<String>, policy: RateLimitPolicy) -> Self {
        let spacing = Quota::with_period(policy.min_delay).map(RateLimiter::direct);

        Self {
            provider: provider.into(),
            policy,
            semaphore: Arc::new(Semaphore::new(policy.max_concurrent.max(1))),
            spacing,
            burst: Mutex::new(VecDeque::new()),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Free concurrency slots right now
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait until all three gates allow a call
    pub async fn acquire(&self) -> Result<RateLimitPermit, ProviderError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ProviderError::RateLimiterClosed {
                provider: self.provider.clone(),
            })?;

        if let Some(spacing) = &self.spacing {
            spacing.until_ready().await;
        }

        self.wait_for_burst_slot().await;

        Ok(RateLimitPermit { _permit: permit })
    }

    async fn wait_for_burst_slot(&self) {
        let limit = self.policy.burst_limit;
        let window = self.policy.burst_window;
        if limit == 0 || window.is_zero() {
            return;
        }

        loop {
            let wait = {
                let mut starts = self.burst.lock().await;
                let now = Instant::now();
                while let Some(front) = starts.front() {
                    if now.duration_since(*front) >= window {
                        starts.pop_front();
                    } else {
                        break;
                    }
                }

                if starts.len() < limit {
                    starts.push_back(now);
                    return;
                }

                match starts.front() {
                    Some(oldest) => window.saturating_sub(now.duration_since(*oldest)),
                    None => Duration::ZERO,
                }
            };

            debug!(
                provider = %self.provider,
                wait_ms = wait.as_millis() as u64,
                "Burst window full, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_concurrency_cap() {
        let limiter = Arc::new(ProviderRateLimiter::new(
            "test",
            RateLimitPolicy::new(2, Duration::ZERO, 0, Duration::ZERO),
        ));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let limiter = limiter.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let _permit = limiter.acquire().await.unwrap();
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(limiter.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_min_delay_spacing() {
        let limiter = ProviderRateLimiter::new(
            "test",
            RateLimitPolicy::new(4, Duration::from_millis(50), 0, Duration::ZERO),
        );

        let start = std::time::Instant::now();
        for _ in 0..3 {
            let _permit = limiter.acquire().await.unwrap();
        }
        // First call is immediate, the next two wait ~50ms each
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_burst_window_blocks_until_oldest_expires() {
        let limiter = ProviderRateLimiter::new(
            "test",
            RateLimitPolicy::new(4, Duration::ZERO, 2, Duration::from_millis(80)),
        );

        let start = std::time::Instant::now();
        for _ in 0..3 {
            let _permit = limiter.acquire().await.unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(70));
    }

    #[tokio::test]
    async fn test_unlimited_policy_does_not_wait() {
        let limiter = ProviderRateLimiter::new("test", RateLimitPolicy::unlimited());
        let start = std::time::Instant::now();
        for _ in 0..20 {
            let _permit = limiter.acquire().await.unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
