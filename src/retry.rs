//! Retry logic with exponential backoff
//!
//! Used around Bedrock calls so throttling does not immediately turn a
//! resource into a zero-cost placeholder.

use crate::error::{AnalyzerError, IsRetryable, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Exponential backoff retry policy
#[derive(Debug, Clone)]
pub struct ExponentialBackoffPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    jitter_factor: f64,
}

impl ExponentialBackoffPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(20),
            jitter_factor: 0.1,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff delay for the given zero-based attempt
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponential = self.initial_delay.as_millis() as f64 * 2f64.powi(attempt as i32);
        let delay_ms = exponential.min(self.max_delay.as_millis() as f64);

        let jitter = delay_ms * self.jitter_factor * fastrand::f64();
        Duration::from_millis((delay_ms + jitter) as u64)
    }

    /// Run `f` until it succeeds, fails with a non-retryable error, or the
    /// attempts are exhausted
    pub async fn execute_with_retry<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match f().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt + 1 >= self.max_attempts => {
                    warn!("Max retries ({}) reached", self.max_attempts);
                    return Err(AnalyzerError::Retryable {
                        attempt: attempt + 1,
                        max_attempts: self.max_attempts,
                        reason: e.to_string(),
                        source: Some(Box::new(e)),
                    });
                }
                Err(e) => {
                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        "Retryable error (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        self.max_attempts,
                        backoff,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for ExponentialBackoffPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn throttled() -> AnalyzerError {
        AnalyzerError::Bedrock {
            message: "ThrottlingException".to_string(),
            transient: true,
            source: None,
        }
    }

    fn fast(max_attempts: u32) -> ExponentialBackoffPolicy {
        ExponentialBackoffPolicy::new(max_attempts).with_initial_delay(Duration::from_millis(1))
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = ExponentialBackoffPolicy::new(10);
        let delay = policy.calculate_backoff(20);
        assert!(delay <= Duration::from_millis(22_000));
        assert!(delay >= Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = fast(3)
            .execute_with_retry(move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(throttled())
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = fast(5)
            .execute_with_retry(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AnalyzerError::UnparseableResponse {
                    address: "aws_instance.web".to_string(),
                    reason: "no JSON".to_string(),
                })
            })
            .await;

        assert!(matches!(result, Err(AnalyzerError::UnparseableResponse { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = fast(2)
            .execute_with_retry(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(throttled())
            })
            .await;

        assert!(matches!(
            result,
            Err(AnalyzerError::Retryable { attempt: 2, max_attempts: 2, .. })
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
