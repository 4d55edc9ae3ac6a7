//! Retry executor with per-attempt and global timeouts and exponential
//! backoff.

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::models::ExecutionConfig;
use crate::resilience::CircuitBreaker;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::warn;

/// Retry budget for one protected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts. Zero means a single attempt with no retry.
    pub max_attempts: u32,
    /// Timeout applied to each attempt. Zero disables it.
    pub per_attempt_timeout: Duration,
    /// Budget for the whole retry loop. Zero disables it.
    pub global_timeout: Duration,
    /// Base delay for exponential backoff between attempts.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Policy for one execution configuration: attempt budget and attempt
    /// timeout from the config, loop-wide budget and backoff base from the
    /// runtime configuration.
    pub fn for_config(config: &ExecutionConfig, runtime: &RelayConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            per_attempt_timeout: config.attempt_timeout(),
            global_timeout: runtime.global_timeout(),
            base_delay: runtime.base_delay(),
        }
    }

    /// Single attempt, no timeouts. Used where the configuration carries
    /// no retry settings.
    pub fn once() -> Self {
        Self {
            max_attempts: 0,
            per_attempt_timeout: Duration::ZERO,
            global_timeout: Duration::ZERO,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Execute `operation` under `policy` with `breaker` protection.
///
/// Before each attempt the breaker is checked (failing fast with
/// `CircuitOpen` while it rejects) and the global budget is checked
/// (failing with `GlobalTimeout` without attempting once exceeded). A
/// transient failure records a breaker failure, sleeps
/// `base_delay * 2^attempt` and retries; a non-transient failure
/// propagates immediately. Exhausting the attempt budget yields
/// `RetryExhausted`.
pub async fn execute_with_retry<T, F, Fut>(
    breaker: &CircuitBreaker,
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts_allowed = policy.max_attempts.max(1);
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        breaker.try_acquire().await?;

        if !policy.global_timeout.is_zero() && started.elapsed() >= policy.global_timeout {
            return Err(RelayError::GlobalTimeout {
                operation: operation_name.to_string(),
                global_timeout: policy.global_timeout,
            });
        }

        let outcome = if policy.per_attempt_timeout.is_zero() {
            operation().await
        } else {
            match tokio::time::timeout(policy.per_attempt_timeout, operation()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(RelayError::transient(format!(
                    "attempt timed out after {:?}",
                    policy.per_attempt_timeout
                ))),
            }
        };

        match outcome {
            Ok(value) => {
                breaker.record_success().await;
                return Ok(value);
            }
            Err(error) if error.is_transient() => {
                breaker.record_failure().await;
                attempt += 1;
                if attempt >= attempts_allowed {
                    return Err(RelayError::RetryExhausted {
                        attempts: attempt,
                        message: error.to_string(),
                    });
                }
                let delay = policy.base_delay * 2u32.saturating_pow(attempt - 1);
                warn!(
                    operation = operation_name,
                    attempt,
                    attempts_allowed,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "transient failure, backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::CircuitBreakerConfig;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn lenient_breaker() -> CircuitBreaker {
        CircuitBreaker::new(
            "retry-test".to_string(),
            CircuitBreakerConfig {
                failure_threshold: 100,
                cooldown: Duration::from_secs(60),
            },
        )
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            per_attempt_timeout: Duration::ZERO,
            global_timeout: Duration::ZERO,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn transient_failures_then_success_counts_attempts() {
        let breaker = lenient_breaker();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = execute_with_retry(&breaker, &fast_policy(5), "flaky", move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(RelayError::transient("connection reset"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        // Failed twice, succeeded on the third invocation.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_failure_is_not_retried() {
        let breaker = lenient_breaker();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> =
            execute_with_retry(&breaker, &fast_policy(5), "broken", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(RelayError::Validation("bad input".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(RelayError::Validation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausting_attempts_is_terminal() {
        let breaker = lenient_breaker();
        let result: Result<()> =
            execute_with_retry(&breaker, &fast_policy(3), "down", || async {
                Err(RelayError::transient("timeout"))
            })
            .await;

        assert!(matches!(
            result,
            Err(RelayError::RetryExhausted { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn zero_attempts_means_execute_once() {
        let breaker = lenient_breaker();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> =
            execute_with_retry(&breaker, &fast_policy(0), "single", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(RelayError::transient("timeout"))
                }
            })
            .await;

        assert!(matches!(result, Err(RelayError::RetryExhausted { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn per_attempt_timeout_is_transient() {
        let breaker = lenient_breaker();
        let policy = RetryPolicy {
            max_attempts: 2,
            per_attempt_timeout: Duration::from_millis(20),
            global_timeout: Duration::ZERO,
            base_delay: Duration::from_millis(1),
        };

        let result: Result<()> = execute_with_retry(&breaker, &policy, "slow", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(RelayError::RetryExhausted { .. })));
    }

    #[tokio::test]
    async fn open_breaker_fails_fast_without_invoking() {
        let breaker = CircuitBreaker::new(
            "tripped".to_string(),
            CircuitBreakerConfig {
                failure_threshold: 1,
                cooldown: Duration::from_secs(60),
            },
        );
        breaker.record_failure().await;

        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<()> =
            execute_with_retry(&breaker, &fast_policy(3), "guarded", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert!(matches!(result, Err(RelayError::CircuitOpen { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn global_timeout_stops_the_loop() {
        let breaker = lenient_breaker();
        let policy = RetryPolicy {
            max_attempts: 1_000,
            per_attempt_timeout: Duration::ZERO,
            global_timeout: Duration::from_millis(30),
            base_delay: Duration::from_millis(10),
        };

        let result: Result<()> = execute_with_retry(&breaker, &policy, "budget", || async {
            Err(RelayError::transient("timeout"))
        })
        .await;

        assert!(matches!(result, Err(RelayError::GlobalTimeout { .. })));
    }
}
