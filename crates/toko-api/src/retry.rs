//! # Retry Helper
//!
//! Bounded, exponential-backoff retry for transient failures.
//!
//! ## Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Attempt 1 ── fails (network/5xx) ── sleep 1s                   │
//! │  Attempt 2 ── fails ─────────────── sleep 2s                    │
//! │  Attempt 3 ── fails ─────────────── sleep 4s                    │
//! │  Attempt 4 ── fails ─────────────── give up, surface the error  │
//! │                                                                 │
//! │  Non-retryable failures (4xx, validation, auth) surface         │
//! │  immediately with no retry at all.                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This is the one piece of deliberate resilience machinery in the
//! client; nothing else retries on its own.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};

/// Retry behavior for one operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (3 means up to 4 attempts total).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Double the delay on every retry when true; constant delay otherwise.
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            exponential: true,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_backoff,
            initial_interval: self.initial_backoff,
            randomization_factor: 0.0,
            multiplier: if self.exponential { 2.0 } else { 1.0 },
            max_interval: Duration::from_secs(60),
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }
}

/// Runs `operation`, retrying per `policy` while the failure is retryable.
///
/// Only network errors and 5xx responses are retried. After
/// `policy.max_retries` failed retries the last error is returned and no
/// further attempt is made.
pub async fn retry_with_policy<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut backoff = policy.backoff();
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = backoff.next_backoff().unwrap_or(policy.initial_backoff);
                debug!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                if err.is_retryable() {
                    warn!(attempts = attempt + 1, "giving up after repeated failures");
                }
                return Err(err);
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            exponential: true,
        }
    }

    #[tokio::test]
    async fn test_stops_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: ApiResult<()> = retry_with_policy(&fast_policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::network("down")) }
        })
        .await;

        assert!(result.is_err());
        // Initial attempt + 3 retries, then terminal failure.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: ApiResult<()> = retry_with_policy(&fast_policy(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::from_response(422, None)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_when_failure_clears() {
        let calls = AtomicU32::new(0);
        let result = retry_with_policy(&fast_policy(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ApiError::from_response(500, None))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let result = retry_with_policy(&fast_policy(3), || async { Ok("ok") }).await;
        assert_eq!(result.unwrap(), "ok");
    }
}
