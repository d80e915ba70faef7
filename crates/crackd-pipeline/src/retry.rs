//! Bounded retry with linear backoff for the image-registration step.
//!
//! Registration is the one step exposed to transient backend unavailability
//! (the freshly uploaded object may not be visible yet), so it is the only
//! step that retries. Presign, upload, and generate run exactly once.

use std::future::Future;
use std::time::Duration;

use crackd_core::{Config, PipelineError};

const MAX_ATTEMPTS: u32 = 4;
const BACKOFF_UNIT_MS: u64 = 600;

/// Retry parameters: at most `max_attempts` calls, sleeping
/// `attempt * backoff_unit` after failed attempt `attempt` (600ms, 1200ms,
/// 1800ms before attempts 2, 3, 4 at the defaults).
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: MAX_ATTEMPTS,
            backoff_unit: Duration::from_millis(BACKOFF_UNIT_MS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        RetryPolicy {
            max_attempts: config.register_max_attempts,
            backoff_unit: Duration::from_millis(config.register_backoff_ms),
        }
    }

    /// Delay slept after failed attempt `attempt` (1-indexed).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }

    /// Run `call` until it succeeds, fails terminally, or attempts run out.
    ///
    /// `observe` is invoked with the 1-indexed attempt number before each
    /// call. A non-retryable failure, or a failure on the final attempt,
    /// propagates that failure verbatim; no summary error is synthesized.
    pub async fn run<T, O, F, Fut>(&self, mut observe: O, mut call: F) -> Result<T, PipelineError>
    where
        O: FnMut(u32),
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PipelineError>>,
    {
        let mut attempt = 1u32;
        loop {
            observe(attempt);
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() || attempt >= self.max_attempts {
                        return Err(err);
                    }
                    let delay = self.backoff_after(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Registration attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn transient(status: u16) -> PipelineError {
        PipelineError::Register {
            status: Some(status),
            message: format!("Failed to register uploaded image (HTTP {status})"),
            retryable: PipelineError::retryable_status(status),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_fourth_attempt_with_linear_backoff() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));
        let observed = Arc::new(AtomicU32::new(0));

        let start = tokio::time::Instant::now();
        let calls_in = calls.clone();
        let observed_in = observed.clone();
        let result = policy
            .run(
                move |attempt| {
                    observed_in.store(attempt, Ordering::SeqCst);
                },
                move || {
                    let calls = calls_in.clone();
                    async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                        if n < 4 {
                            Err(transient(500))
                        } else {
                            Ok(n)
                        }
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(result, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(observed.load(Ordering::SeqCst), 4);
        // 600 + 1200 + 1800 ms of backoff between the four attempts.
        assert_eq!(start.elapsed(), Duration::from_millis(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_propagates_without_sleep() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));

        let start = tokio::time::Instant::now();
        let calls_in = calls.clone();
        let err = policy
            .run(
                |_| {},
                move || {
                    let calls = calls_in.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<u32, _>(transient(400))
                    }
                },
            )
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_the_last_failure() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));

        let calls_in = calls.clone();
        let err = policy
            .run(
                |_| {},
                move || {
                    let calls = calls_in.clone();
                    async move {
                        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                        Err::<u32, _>(transient(if n == 4 { 503 } else { 500 }))
                    }
                },
            )
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // The final attempt's error comes back, not a synthesized summary.
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_returns_immediately() {
        let policy = RetryPolicy::default();
        let start = tokio::time::Instant::now();
        let result = policy.run(|_| {}, || async { Ok(7u32) }).await.unwrap();
        assert_eq!(result, 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn backoff_is_linear_in_attempt_index() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_after(1), Duration::from_millis(600));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(1200));
        assert_eq!(policy.backoff_after(3), Duration::from_millis(1800));
    }
}
