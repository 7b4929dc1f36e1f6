//! Bounded retry with exponential backoff
//!
//! [`retry_with_policy`] is generic over any fallible async operation and
//! a classifier function, so backoff timing can be unit tested without
//! real network calls. Attempts are strictly sequential.

use crate::classifier::RetryVerdict;
use crate::error::{AnalysisClientError, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Attempt budget and backoff shape for retried operations
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempt count, including the first attempt
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each further attempt
    pub base_delay: Duration,
    /// Ceiling applied to every backoff delay
    pub max_delay: Duration,
    cancel: CancellationToken,
}

impl RetryPolicy {
    /// Create a policy from an attempt budget and backoff bounds
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a cancellation token
    ///
    /// Cancellation is checked before each attempt and interrupts backoff
    /// sleeps; a cancelled run fails with [`AnalysisClientError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Backoff delay after the given 0-indexed failed attempt
    ///
    /// Grows as `base * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(crate::config::DEFAULT_BASE_DELAY_MS),
            Duration::from_millis(crate::config::DEFAULT_MAX_DELAY_MS),
        )
    }
}

/// Run `op` with bounded retry and exponential backoff
///
/// The first attempt runs immediately. On failure, `classify` decides
/// whether another attempt is allowed: terminal failures propagate
/// untouched, transient ones wait out the backoff delay first. Once the
/// attempt budget is spent the last failure is returned wrapped in
/// [`AnalysisClientError::RetriesExhausted`].
pub async fn retry_with_policy<T, F, Fut, C>(
    policy: &RetryPolicy,
    classify: C,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&AnalysisClientError) -> RetryVerdict,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt: u32 = 0;

    loop {
        if policy.cancel.is_cancelled() {
            return Err(AnalysisClientError::Cancelled);
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !classify(&error).is_transient() {
                    return Err(error);
                }

                attempt += 1;
                if attempt >= max_attempts {
                    tracing::warn!(attempts = max_attempts, error = %error, "retry budget spent");
                    return Err(AnalysisClientError::retries_exhausted(max_attempts, error));
                }

                let delay = policy.delay_for_attempt(attempt - 1);
                tracing::debug!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient failure, backing off"
                );

                tokio::select! {
                    _ = policy.cancel.cancelled() => return Err(AnalysisClientError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn flaky_op(
        calls: &AtomicU32,
        failures_before_success: u32,
    ) -> impl Future<Output = Result<&'static str>> + '_ {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if call < failures_before_success {
                Err(AnalysisClientError::status(500, "still processing"))
            } else {
                Ok("done")
            }
        }
    }

    #[test]
    fn test_delay_growth_and_cap() {
        let policy = RetryPolicy::new(
            5,
            Duration::from_secs(1),
            Duration::from_secs(5),
        );

        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(5));
        // Shift amounts past the bit width must not wrap around
        assert_eq!(policy.delay_for_attempt(40), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_short_circuits() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let start = Instant::now();
        let value = retry_with_policy(&policy, classify, || flaky_op(&calls, 0))
            .await
            .unwrap();

        assert_eq!(value, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_makes_exactly_one_attempt() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let start = Instant::now();
        let result: Result<()> = retry_with_policy(&policy, classify, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AnalysisClientError::status(404, "unknown analysis id")) }
        })
        .await;

        assert!(matches!(
            result,
            Err(AnalysisClientError::ClientRequest { status: 404, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // No backoff delay is incurred for a terminal failure
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_retry_with_backoff() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let start = Instant::now();
        let value = retry_with_policy(&policy, classify, || flaky_op(&calls, 2))
            .await
            .unwrap();

        assert_eq!(value, "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two backoff delays before the third attempt: 1s then 2s
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_wraps_last_failure() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let start = Instant::now();
        let result: Result<&'static str> =
            retry_with_policy(&policy, classify, || flaky_op(&calls, u32::MAX)).await;

        match result {
            Err(AnalysisClientError::RetriesExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(
                    *source,
                    AnalysisClientError::Server { status: 500, .. }
                ));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Delays between attempts only; none after the last failure
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_are_non_decreasing_and_capped() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(
            5,
            Duration::from_secs(1),
            Duration::from_secs(5),
        );

        let start = Instant::now();
        let result: Result<&'static str> =
            retry_with_policy(&policy, classify, || flaky_op(&calls, u32::MAX)).await;

        assert!(matches!(
            result,
            Err(AnalysisClientError::RetriesExhausted { attempts: 5, .. })
        ));
        // 1 + 2 + 4 + 5(capped) seconds across four backoffs
        assert_eq!(start.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pre_cancelled_token_skips_all_attempts() {
        let calls = AtomicU32::new(0);
        let token = CancellationToken::new();
        token.cancel();
        let policy = RetryPolicy::default().with_cancellation(token);

        let result: Result<&'static str> =
            retry_with_policy(&policy, classify, || flaky_op(&calls, 0)).await;

        assert!(matches!(result, Err(AnalysisClientError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_backoff() {
        let calls = AtomicU32::new(0);
        let token = CancellationToken::new();
        let policy = RetryPolicy::default().with_cancellation(token.clone());

        let run = tokio::spawn(async move {
            retry_with_policy(&policy, classify, || flaky_op(&calls, u32::MAX)).await
        });

        // Let the first attempt fail and the backoff sleep begin
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();

        let result: Result<&'static str> = run.await.unwrap();
        assert!(matches!(result, Err(AnalysisClientError::Cancelled)));
    }
}
