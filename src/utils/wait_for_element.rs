//! Element polling utility for SPA support
//!
//! Provides wait_for_any_selector() which polls for DOM elements with exponential backoff.
//! Single Page Applications render their content via JavaScript after the
//! load event fires, so the load lifecycle alone says little about content.

use std::time::Duration;

use chromiumoxide::Page;

use crate::browser::BrowserError;

/// Wait until at least one of `selectors` matches an element in the DOM
///
/// The selectors are joined into a single selector list, so one
/// `querySelector` round-trip covers all of them.
///
/// # Polling Strategy
/// - Starts at 100ms intervals
/// - Doubles each retry (exponential backoff)
/// - Caps at 1 second maximum interval
/// - Total duration limited by timeout parameter
pub async fn wait_for_any_selector(
    page: &Page,
    selectors: &[String],
    timeout: Duration,
) -> Result<(), BrowserError> {
    if selectors.is_empty() {
        return Ok(());
    }
    let selector_list = selectors.join(", ");

    let start = std::time::Instant::now();
    let mut poll_interval = Duration::from_millis(100);
    let max_interval = Duration::from_secs(1);

    loop {
        if page.find_element(selector_list.as_str()).await.is_ok() {
            return Ok(());
        }

        if start.elapsed() >= timeout {
            return Err(BrowserError::Timeout(format!(
                "none of '{}' appeared within {}ms",
                selector_list,
                timeout.as_millis()
            )));
        }

        tokio::time::sleep(poll_interval).await;
        poll_interval = (poll_interval * 2).min(max_interval);
    }
}
