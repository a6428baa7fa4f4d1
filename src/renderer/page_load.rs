//! One render attempt inside an already launched session

use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide_cdp::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use tracing::{debug, warn};

use super::RendererConfig;
use crate::browser::{BrowserError, BrowserResult, BrowserWrapper, create_blank_page};
use crate::utils::constants::{ACCEPT_HTML, ACCEPT_LANGUAGE};
use crate::utils::wait_for_any_selector;

const RESOURCE_COUNT_JS: &str = "performance.getEntriesByType('resource').length";
const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Open a page, drive it to a rendered state and return its HTML
///
/// The page is closed on every path; the caller owns the session teardown.
pub(super) async fn load_rendered_html(
    session: &BrowserWrapper,
    url: &str,
    user_agent: &str,
    config: &RendererConfig,
) -> BrowserResult<String> {
    let page = create_blank_page(session)
        .await
        .map_err(|e| BrowserError::PageCreationFailed(format!("{e:#}")))?;

    let result = drive_page(&page, url, user_agent, config).await;

    if let Err(e) = page.close().await {
        debug!("Failed to close page for {}: {}", url, e);
    }
    result
}

async fn drive_page(
    page: &Page,
    url: &str,
    user_agent: &str,
    config: &RendererConfig,
) -> BrowserResult<String> {
    apply_request_headers(page, user_agent).await?;

    let navigation_timeout = Duration::from_millis(config.navigation_timeout_ms);
    let idle_window = Duration::from_millis(config.network_idle_ms);
    tokio::time::timeout(navigation_timeout, navigate_until_idle(page, url, idle_window))
        .await
        .map_err(|_| {
            BrowserError::Timeout(format!(
                "navigation to {} exceeded {}ms",
                url, config.navigation_timeout_ms
            ))
        })??;

    // Plenty of legitimate pages match none of the selectors
    let selector_timeout = Duration::from_millis(config.selector_timeout_ms);
    if let Err(e) = wait_for_any_selector(page, &config.content_selectors, selector_timeout).await {
        warn!("Content selectors not found on {}: {}", url, e);
    }

    page.evaluate(SCROLL_TO_BOTTOM_JS)
        .await
        .map_err(|e| BrowserError::NavigationFailed(format!("scroll on {url}: {e}")))?;
    tokio::time::sleep(Duration::from_millis(config.settle_delay_ms)).await;

    let html = page
        .content()
        .await
        .map_err(|e| BrowserError::NavigationFailed(format!("capture of {url}: {e}")))?;

    debug!("Rendered {} ({} bytes of HTML)", url, html.len());
    Ok(html)
}

async fn apply_request_headers(page: &Page, user_agent: &str) -> BrowserResult<()> {
    page.execute(SetUserAgentOverrideParams {
        user_agent: user_agent.to_string(),
        accept_language: Some(ACCEPT_LANGUAGE.to_string()),
        platform: None,
        user_agent_metadata: None,
    })
    .await
    .map_err(|e| BrowserError::PageCreationFailed(format!("user agent override: {e}")))?;

    let headers = Headers::new(serde_json::json!({
        "Accept-Language": ACCEPT_LANGUAGE,
        "Accept": ACCEPT_HTML,
    }));
    page.execute(SetExtraHttpHeadersParams::new(headers))
        .await
        .map_err(|e| BrowserError::PageCreationFailed(format!("extra headers: {e}")))?;

    Ok(())
}

async fn navigate_until_idle(page: &Page, url: &str, idle_window: Duration) -> BrowserResult<()> {
    page.goto(url)
        .await
        .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;
    page.wait_for_navigation()
        .await
        .map_err(|e| BrowserError::NavigationFailed(format!("{url}: {e}")))?;

    wait_for_network_quiet(page, idle_window).await;
    Ok(())
}

/// Poll the resource timeline until no new entries appear for one idle window
///
/// Best effort: if the page refuses the probe we stop waiting instead of
/// failing the render. The caller bounds the total wait.
async fn wait_for_network_quiet(page: &Page, idle_window: Duration) {
    let mut previous = match resource_count(page).await {
        Some(count) => count,
        None => return,
    };

    loop {
        tokio::time::sleep(idle_window).await;
        let Some(current) = resource_count(page).await else {
            return;
        };
        if current == previous {
            debug!("Network quiet at {} resources", current);
            return;
        }
        previous = current;
    }
}

async fn resource_count(page: &Page) -> Option<u64> {
    let value = match page.evaluate(RESOURCE_COUNT_JS).await {
        Ok(result) => result.into_value::<serde_json::Value>().ok()?,
        Err(e) => {
            debug!("Resource timeline probe failed: {}", e);
            return None;
        }
    };
    value.as_u64()
}
