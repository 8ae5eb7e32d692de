//! Retry with exponential backoff for rate-limited API calls.
//!
//! Only [`ScrapeError::RateLimited`] is treated as transient; every
//! other error surfaces immediately. Delays double per attempt up to a
//! cap, with uniform random jitter on top.

use std::future::Future;
use std::time::Duration;

use crate::error::{ScrapeError, ScrapeResult};

/// Backoff parameters for rate-limited retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before giving up (first call included)
    pub max_attempts: u32,

    /// Delay before the first retry
    pub base_delay: Duration,

    /// Upper bound on any single delay
    pub max_delay: Duration,

    /// Jitter added on top of each delay, as a fraction of it
    pub jitter_fraction: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(300),
            jitter_fraction: 0.1,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-delay policy for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter_fraction: 0.0,
        }
    }

    /// Set the maximum attempt count.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the base delay.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the delay cap.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the jitter fraction.
    pub fn with_jitter_fraction(mut self, jitter_fraction: f64) -> Self {
        self.jitter_fraction = jitter_fraction;
        self
    }

    /// Delay before retrying after the given failed attempt (1-based):
    /// `min(max_delay, base_delay * 2^(attempt-1))` plus uniform jitter
    /// in `[0, delay * jitter_fraction]`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63);
        let exponential = self.base_delay.as_secs_f64() * 2f64.powi(exponent as i32);
        let capped = exponential.min(self.max_delay.as_secs_f64());
        let jitter = if self.jitter_fraction > 0.0 {
            capped * self.jitter_fraction * fastrand::f64()
        } else {
            0.0
        };
        Duration::from_secs_f64(capped + jitter)
    }
}

/// Run `op`, retrying on rate limiting per `policy`.
///
/// Exactly `policy.max_attempts` attempts are made before reporting
/// [`ScrapeError::RetriesExhausted`]. Each retry is logged with its
/// attempt count and delay so backoff progress is visible to the
/// operator rather than swallowed.
pub async fn retry_rate_limited<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> ScrapeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ScrapeResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(ScrapeError::RateLimited) => {
                if attempt >= policy.max_attempts {
                    return Err(ScrapeError::RetriesExhausted { attempts: attempt });
                }
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delays_double_without_jitter() {
        let policy = RetryPolicy::default().with_jitter_fraction(0.0);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(8));
    }

    #[test]
    fn delays_strictly_increase_below_cap() {
        let policy = RetryPolicy::default().with_jitter_fraction(0.0);
        for attempt in 1..8 {
            assert!(policy.delay_for_attempt(attempt + 1) > policy.delay_for_attempt(attempt));
        }
    }

    #[test]
    fn delay_is_capped() {
        let policy = RetryPolicy::default().with_jitter_fraction(0.0);
        assert_eq!(policy.delay_for_attempt(20), Duration::from_secs(300));
        // No overflow even for absurd attempt counts
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(300));
    }

    #[test]
    fn jitter_stays_within_fraction() {
        let policy = RetryPolicy::default().with_jitter_fraction(0.1);
        for _ in 0..100 {
            let delay = policy.delay_for_attempt(3).as_secs_f64();
            assert!((4.0..=4.4).contains(&delay));
        }
    }

    #[tokio::test]
    async fn returns_first_success() {
        let policy = RetryPolicy::immediate(5);
        let result = retry_rate_limited(&policy, || async { Ok::<_, ScrapeError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn retries_until_rate_limit_clears() {
        let policy = RetryPolicy::immediate(5);
        let attempts = AtomicU32::new(0);
        let result = retry_rate_limited(&policy, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ScrapeError::RateLimited)
                } else {
                    Ok("ok")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exactly_max_attempts_before_exhaustion() {
        let policy = RetryPolicy::immediate(4);
        let attempts = AtomicU32::new(0);
        let result: ScrapeResult<()> = retry_rate_limited(&policy, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(ScrapeError::RateLimited) }
        })
        .await;
        assert!(matches!(
            result,
            Err(ScrapeError::RetriesExhausted { attempts: 4 })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let policy = RetryPolicy::immediate(5);
        let attempts = AtomicU32::new(0);
        let result: ScrapeResult<()> = retry_rate_limited(&policy, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(ScrapeError::Api {
                    status: 500,
                    message: "server error".into(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(ScrapeError::Api { status: 500, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
