//! Browser infrastructure for launching and tearing down isolated Chrome sessions

mod wrapper;

pub use crate::browser_setup::{download_managed_browser, find_browser_executable};
pub use wrapper::{BrowserWrapper, create_blank_page, launch_session};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    #[error("Failed to find browser executable: {0}")]
    NotFound(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Rendered HTML too short ({0} chars)")]
    HtmlTooShort(usize),

    #[error("Failed to render {url} after {attempts} attempt(s): {reason}")]
    RenderFailed {
        url: String,
        attempts: u32,
        reason: String,
    },
}

pub type BrowserResult<T> = Result<T, BrowserError>;
