//! Retry Module
//!
//! Retries a single fallible async call with pure exponential backoff.
//!
//! Attempt `n` (0-based) that fails is followed by a wait of
//! `base_delay * 2^n` before the next attempt, with no jitter. The first
//! attempt counts toward the budget, so `max_attempts = 3` means at most three
//! calls and two waits. No state is kept between calls.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;

/// Default number of attempts, the first one included
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

// == Retry Policy ==
/// Attempt budget and backoff base for [`retry_with_backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed; zero is treated as one
    pub max_attempts: u32,
    /// Wait before the first retry, doubled for each one after
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.retry_max_attempts, config.retry_base_delay())
    }

    /// Attempts actually made at most; the call always runs at least once.
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    // == Delay ==
    /// Wait after the failed attempt with 0-based index `attempt`.
    ///
    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    // == Run ==
    /// Runs `operation`, retrying every failure until the budget is spent.
    ///
    /// Returns the first success, or the last attempt's error unchanged.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_if(operation, |_| true).await
    }

    /// Like [`run`](Self::run), but gives up as soon as `should_retry`
    /// rejects an error, returning that error without waiting.
    pub async fn run_if<T, E, F, Fut, P>(&self, mut operation: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let attempts = self.effective_attempts();
        let mut attempt = 0u32;

        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt + 1 >= attempts {
                warn!(attempts, "All attempts failed, giving up");
                return Err(err);
            }

            if !should_retry(&err) {
                debug!(attempt = attempt + 1, "Error is not retryable, giving up");
                return Err(err);
            }

            let delay = self.delay_for(attempt);
            warn!(
                attempt = attempt + 1,
                max_attempts = attempts,
                delay_ms = delay.as_millis() as u64,
                "Attempt failed, retrying after backoff"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

// == Retry With Backoff ==
/// Runs `operation` up to `max_retries` times in total, waiting
/// `base_delay * 2^attempt` between failures.
///
/// `max_retries = 0` still makes one attempt.
///
/// # Example
/// ```ignore
/// let genres = retry_with_backoff(|| client.fetch_genres(), 3, Duration::from_millis(1000)).await?;
/// ```
pub async fn retry_with_backoff<T, E, F, Fut>(
    operation: F,
    max_retries: u32,
    base_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    RetryPolicy::new(max_retries, base_delay).run(operation).await
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    const BASE: Duration = Duration::from_millis(10);

    #[test]
    fn test_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_delay_is_pure_exponential() {
        let policy = RetryPolicy::new(5, BASE);

        assert_eq!(policy.delay_for(0), Duration::from_millis(10));
        assert_eq!(policy.delay_for(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for(2), Duration::from_millis(40));
        assert_eq!(policy.delay_for(3), Duration::from_millis(80));
    }

    #[test]
    fn test_delay_saturates() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));

        assert_eq!(policy.delay_for(40), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_makes_one_call() {
        let calls = AtomicU32::new(0);

        let result = retry_with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, &str>("genres") }
            },
            3,
            BASE,
        )
        .await;

        assert_eq!(assert_ok!(result), "genres");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_two_failures() {
        let calls = AtomicU32::new(0);

        let result = retry_with_backoff(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("upstream unavailable")
                    } else {
                        Ok(42)
                    }
                }
            },
            3,
            BASE,
        )
        .await;

        assert_eq!(assert_ok!(result), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error_after_backoff() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), String> = retry_with_backoff(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure #{n}")) }
            },
            3,
            BASE,
        )
        .await;

        assert_eq!(assert_err!(result), "failure #2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_still_attempts_once() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), &str> = retry_with_backoff(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("boom") }
            },
            0,
            BASE,
        )
        .await;

        assert_err!(result);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_if_stops_on_rejected_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, BASE);

        let result: Result<(), u16> = policy
            .run_if(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move { Err(if n == 0 { 503 } else { 404 }) }
                },
                |status| *status >= 500,
            )
            .await;

        assert_eq!(assert_err!(result), 404);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_retries_everything() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(4, BASE);

        let result: Result<(), u16> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(404) }
            })
            .await;

        assert_err!(result);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
