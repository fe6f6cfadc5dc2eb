//! Retry-with-backoff wrapper for network-calling operations.
//!
//! External dependencies (content hosts, transcription, the LLM) are the
//! dominant failure surface, so retry policy lives in one place. Errors
//! whose [`ErrorKind`](crate::ErrorKind) is not `Api` propagate
//! immediately without consuming an attempt.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

/// How an operation should be retried after transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Number of re-attempts after the first failure. The operation runs
    /// at most `max_retries + 1` times.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Exponential (`base_delay * 2^attempt`) vs constant backoff.
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            exponential: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            exponential: false,
        }
    }

    /// Delay to wait after the given zero-based failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.exponential {
            self.base_delay * 2u32.saturating_pow(attempt)
        } else {
            self.base_delay
        }
    }
}

/// Run `op`, retrying on retryable failures per `policy`.
///
/// After exhausting all attempts the last error is converted into an
/// [`Error::Api`] tagged with `source_name`, preserving the original
/// message. Non-retryable errors (validation, filesystem) propagate
/// immediately.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    source_name: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 0..=policy.max_retries {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    source = source_name,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                // All attempts exhausted. Surface as an Api error naming
                // the dependency, preserving the original message.
                let status = match &e {
                    Error::Api { status, .. } => *status,
                    _ => None,
                };
                return Err(Error::Api {
                    message: format!(
                        "{} failed after {} attempts: {}",
                        source_name, policy.max_retries, e
                    ),
                    source_name: source_name.to_string(),
                    status,
                });
            }
        }
    }

    unreachable!("retry loop always returns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_op_runs_max_retries_plus_one_times() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            exponential: true,
        };

        let result: Result<()> = retry_with_backoff(policy, "OpenAI", move || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::api("connection reset by peer", "OpenAI"))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(Error::Api {
                message,
                source_name,
                ..
            }) => {
                assert_eq!(source_name, "OpenAI");
                assert!(message.contains("connection reset by peer"));
                assert!(message.contains("after 3 attempts"));
            }
            other => panic!("Expected Api error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_validation_error_propagates_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<()> =
            retry_with_backoff(RetryPolicy::default(), "Web", move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(Error::validation("URL cannot be empty", "url"))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = retry_with_backoff(RetryPolicy::default(), "Web", move || {
            let calls = calls_clone.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(Error::api("timed out", "Web"))
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_immediate_success_single_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result = retry_with_backoff(RetryPolicy::default(), "Web", move || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("ok")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            exponential: true,
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn test_constant_delays() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            exponential: false,
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(5), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_filesystem_error_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let result: Result<()> =
            retry_with_backoff(RetryPolicy::default(), "Web", move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(Error::filesystem("disk full", "Free up disk space."))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::Filesystem { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_code_preserved_through_conversion() {
        let policy = RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(10),
            exponential: false,
        };

        let result: Result<()> = retry_with_backoff(policy, "OpenAI", || async {
            Err(Error::Api {
                message: "rate limited".to_string(),
                source_name: "OpenAI".to_string(),
                status: Some(429),
            })
        })
        .await;

        match result {
            Err(Error::Api { status, .. }) => assert_eq!(status, Some(429)),
            other => panic!("Expected Api error, got {:?}", other.map(|_| ())),
        }
    }
}
