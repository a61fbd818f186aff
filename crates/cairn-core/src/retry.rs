//! Bounded sequential retry.

use std::future::Future;

use crate::TRACING_TARGET;

/// Default number of attempts per operation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// The last error of a failed [`retry`] run, with the attempts spent.
#[derive(Debug)]
pub struct RetryError<E> {
    /// Attempts made before giving up.
    pub attempts: u32,
    /// Error returned by the final attempt.
    pub error: E,
}

/// Runs `attempt` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` attempts have been made.
///
/// Attempts run strictly one after another. The closure receives the 1-based
/// attempt number. A `max_attempts` of zero is treated as one.
pub async fn retry<T, E, F, Fut, P>(
    max_attempts: u32,
    is_retryable: P,
    mut attempt: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut current = 1;

    loop {
        match attempt(current).await {
            Ok(value) => return Ok(value),
            Err(error) if current < max_attempts && is_retryable(&error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    attempt = current,
                    max_attempts,
                    error = %error,
                    "Attempt failed, retrying"
                );
                current += 1;
            }
            Err(error) => {
                return Err(RetryError {
                    attempts: current,
                    error,
                });
            }
        }
    }
}
