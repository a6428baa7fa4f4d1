//! Bounded-concurrency worker pool
//!
//! Each item may spawn a whole headless browser, so the number of items in
//! flight is capped by a semaphore built per call. Results are written into
//! the slot matching the input index, never in completion order.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use super::errors::Degraded;

/// Run `worker` over `items` with at most `width` workers in flight
///
/// Returns exactly one outcome per input item, in input order. A failing
/// or panicking worker degrades its own slot only.
pub async fn run_bounded<I, T, F, Fut>(
    items: Vec<I>,
    width: usize,
    worker: F,
) -> Vec<Result<T, Degraded>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, Degraded>> + Send + 'static,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(width.max(1)));
    let worker = Arc::new(worker);
    let mut join_set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let worker = Arc::clone(&worker);

        join_set.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => AssertUnwindSafe(worker(item))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| Err(Degraded::Panicked(panic_message(&*panic)))),
                Err(e) => Err(Degraded::TaskFailed(format!("Semaphore error: {e}"))),
            };
            // Permit released here, success or failure
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<Result<T, Degraded>>> = (0..total).map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(e) => warn!("Pool task did not complete: {}", e),
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| Err(Degraded::TaskFailed("worker task was cancelled".into())))
        })
        .collect()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
