//! Capped-exponential-backoff retry for upstream fetches.
//!
//! The retry budget is bounded and finite; whether an error is worth
//! another attempt is decided by [`FetchError::is_retryable`].

use std::future::Future;

use tracing::{debug, warn};

use super::error::FetchError;
use crate::config::RetryConfig;

/// Execute a fetch operation with retry.
///
/// `make_request` is invoked once per attempt. Returns the first success,
/// or the last error once the budget is exhausted or a non-retryable error
/// occurs.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    source: &str,
    operation: &str,
    make_request: F,
) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    if !config.enabled {
        return make_request().await;
    }

    let max_attempts = config.max_retries + 1;

    for attempt in 0..max_attempts {
        match make_request().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(
                        source = source,
                        operation = operation,
                        attempt = attempt + 1,
                        "Fetch succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(error) => {
                if error.is_retryable() && attempt < max_attempts - 1 {
                    let delay = config.delay_for_attempt(attempt);
                    warn!(
                        source = source,
                        operation = operation,
                        error = %error,
                        attempt = attempt + 1,
                        max_attempts = max_attempts,
                        delay_ms = delay.as_millis(),
                        "Retryable fetch error, will retry after delay"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                if attempt > 0 {
                    warn!(
                        source = source,
                        operation = operation,
                        error = %error,
                        attempts = attempt + 1,
                        "Fetch failed after all retry attempts"
                    );
                }

                return Err(error);
            }
        }
    }

    unreachable!("retry loop always returns")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast_config() -> RetryConfig {
        RetryConfig {
            enabled: true,
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
            jitter: 0.0,
        }
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let attempts = AtomicU32::new(0);

        let result = with_retry(&fast_config(), "test", "fetch", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, FetchError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let attempts = AtomicU32::new(0);

        let result = with_retry(&fast_config(), "test", "fetch", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(FetchError::Status { status: 503 })
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_budget_and_returns_last_error() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&fast_config(), "test", "fetch", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::Status { status: 500 }) }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Status { status: 500 })));
        // max_retries=2 means 3 total attempts.
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn auth_errors_fail_immediately() {
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&fast_config(), "test", "fetch", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::Auth { status: 401 }) }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Auth { status: 401 })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_config_never_retries() {
        let config = RetryConfig {
            enabled: false,
            ..fast_config()
        };
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&config, "test", "fetch", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::Status { status: 500 }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
