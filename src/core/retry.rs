//! Retry utility for transient failures in async operations
//!
//! Lookups are not retried by the scan pipeline itself; clients use this to
//! absorb transport hiccups before an error reaches the pipeline boundary.

use std::time::Duration;
use tokio::time::sleep;

/// Retry policy for async operations
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Zero behaves as one.
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_millis(250),
        }
    }

    /// Policy allowing `retries` extra attempts after the first one
    pub fn with_retries(retries: usize) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            ..Self::no_retry()
        }
    }
}

/// Execute an async operation, retrying only failures accepted by `is_transient`
///
/// # Examples
/// ```rust
/// use barscan::core::retry::{retry_async_when, RetryPolicy};
///
/// # async fn example() -> Result<String, String> {
/// let body = retry_async_when(
///     "fetch_product",
///     RetryPolicy::with_retries(2),
///     || async { Ok::<String, String>("{}".to_string()) },
///     |error: &String| error.contains("connection"),
/// )
/// .await?;
/// # Ok(body)
/// # }
/// ```
pub async fn retry_async_when<F, T, E, Fut, P>(
    operation_name: &str,
    policy: RetryPolicy,
    mut operation: F,
    is_transient: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) if attempt < max_attempts && is_transient(&error) => {
                log::debug!(
                    "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
                    operation_name,
                    attempt,
                    max_attempts,
                    policy.delay,
                    error
                );
                sleep(policy.delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
