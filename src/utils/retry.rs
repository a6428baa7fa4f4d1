//! Linear-backoff retry helpers
//!
//! Both the renderer (whole render sequence) and the search HTTP leg use the
//! same policy: after failed attempt `n` sleep `n * base_delay`, give up once
//! `max_attempts` attempts have been made.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry `op` on any error
///
/// `op` receives the 1-based attempt number. `max_attempts` counts the total
/// number of calls, so `max_attempts == 2` means one initial try plus one retry.
pub async fn retry_linear<F, Fut, T, E>(
    max_attempts: u32,
    base_delay: Duration,
    op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_linear_if(max_attempts, base_delay, |_| true, op).await
}

/// Retry `op` only while `is_retryable` accepts the error
///
/// Non-retryable errors are returned immediately without sleeping.
pub async fn retry_linear_if<F, Fut, T, E, P>(
    max_attempts: u32,
    base_delay: Duration,
    is_retryable: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= max_attempts || !is_retryable(&e) {
                    return Err(e);
                }

                let delay = base_delay * attempt;
                warn!(
                    "Attempt {}/{} failed, retrying in {}ms: {}",
                    attempt,
                    max_attempts,
                    delay.as_millis(),
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
