//! Timeout validation utilities for browser operations

use std::time::Duration;

use super::errors::ConfigError;

/// Maximum timeout for browser navigation operations (5 minutes)
/// Covers slow-loading sites, heavy SPAs, and network delays
pub const MAX_NAVIGATION_TIMEOUT_MS: u64 = 300_000; // 5 minutes

/// Maximum timeout for waiting on content selectors (30 seconds)
pub const MAX_SELECTOR_TIMEOUT_MS: u64 = 30_000; // 30 seconds

/// Validate timeout for navigation operations
///
/// # Arguments
/// * `field` - Config field name, used in the error message
/// * `ms` - Timeout in milliseconds
///
/// # Returns
/// * `Ok(Duration)` - Validated Duration object
/// * `Err(ConfigError)` - If timeout exceeds MAX_NAVIGATION_TIMEOUT_MS
pub fn validate_navigation_timeout(field: &'static str, ms: u64) -> Result<Duration, ConfigError> {
    validate(field, ms, MAX_NAVIGATION_TIMEOUT_MS)
}

/// Validate timeout for selector waits
pub fn validate_selector_timeout(field: &'static str, ms: u64) -> Result<Duration, ConfigError> {
    validate(field, ms, MAX_SELECTOR_TIMEOUT_MS)
}

fn validate(field: &'static str, ms: u64, max_ms: u64) -> Result<Duration, ConfigError> {
    if ms > max_ms {
        return Err(ConfigError::TimeoutTooLarge { field, ms, max_ms });
    }
    Ok(Duration::from_millis(ms))
}
