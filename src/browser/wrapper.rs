//! Browser session lifecycle for headless renders
//!
//! Every render attempt gets its own browser process and profile directory.
//! `BrowserWrapper::shutdown()` is the clean exit path; `Drop` is the
//! fallback that still aborts the handler and removes the profile.

use anyhow::{Context, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::BrowserConfig;

/// Wrapper for Browser and its event handler task
///
/// Ensures handler is properly cleaned up when browser is dropped.
/// Handler MUST be aborted to prevent it running indefinitely after
/// browser is closed.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    /// Get reference to inner browser
    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser, wait for the process to exit and remove the profile
    ///
    /// We must call BOTH `close()` and `wait()`: dropping only aborts the
    /// handler task, and Chrome keeps file handles on the profile until the
    /// process has fully exited.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed to wait for browser exit: {}", e);
        }
        self.cleanup_temp_dir();
        debug!("Browser session shut down");
    }

    /// Clean up temp directory (blocking operation)
    ///
    /// MUST be called AFTER `browser.wait()` completes to ensure Chrome
    /// has released all file handles. Windows will fail to remove locked files.
    ///
    /// Uses blocking `std::fs::remove_dir_all()` because this may be called
    /// from Drop context where async is not available.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                tracing::warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        // Browser::drop() kills the Chrome process if close() never ran

        if let Some(path) = self.user_data_dir.as_ref() {
            tracing::warn!(
                "BrowserWrapper dropped without shutdown(), removing {} in Drop",
                path.display()
            );
            self.cleanup_temp_dir();
        }
    }
}

/// Launch an isolated browser session presenting `user_agent`
///
/// The profile directory is unique per session (process id + uuid), so
/// concurrent renders never contend for Chrome's profile lock.
///
/// # Handler Lifecycle
/// The handler `JoinHandle` is owned by the returned wrapper and aborted
/// on drop.
pub async fn launch_session(config: &BrowserConfig, user_agent: &str) -> Result<BrowserWrapper> {
    let user_data_dir = std::env::temp_dir().join(format!(
        "kodegen_webfetch_{}_{}",
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    ));

    let (browser, handler) =
        crate::browser_setup::launch_browser(config, Some(user_data_dir.clone()), user_agent)
            .await?;

    info!("Launched browser session ({})", user_data_dir.display());
    Ok(BrowserWrapper::new(browser, handler, user_data_dir))
}

/// Create a blank page in the session
///
/// Headers are applied on the blank page before the target URL is loaded,
/// so the very first request already carries them.
pub async fn create_blank_page(wrapper: &BrowserWrapper) -> Result<Page> {
    let page = wrapper
        .browser()
        .new_page("about:blank")
        .await
        .context("Failed to create blank page")?;

    debug!("Created blank page");
    Ok(page)
}
