use thiserror::Error;

use crate::browser::BrowserError;

/// Reason a single item of a batch was degraded to a placeholder
///
/// Per-item operations return `Result<T, Degraded>`. Batch functions only
/// ever turn this into display text for the one slot that failed; there is
/// no path from a `Degraded` to a failed batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Degraded {
    #[error("{0}")]
    Render(String),

    #[error("Invalid URL")]
    InvalidUrl,

    #[error("no content found")]
    NoContent,

    #[error("worker panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    TaskFailed(String),
}

impl From<BrowserError> for Degraded {
    fn from(err: BrowserError) -> Self {
        Degraded::Render(err.to_string())
    }
}

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field}: timeout cannot exceed {max_ms}ms. Received: {ms}ms")]
    TimeoutTooLarge { field: &'static str, ms: u64, max_ms: u64 },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("relevance threshold must be within [-1, 1]. Received: {0}")]
    Threshold(f32),
}
