//! Shared configuration constants for the acquisition engine
//!
//! This module contains default values and placeholder strings used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default user agent pool for headless renders
///
/// One entry is picked at random per browser session so repeated renders
/// against the same host do not all present an identical fingerprint.
pub const DEFAULT_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:134.0) Gecko/20100101 Firefox/134.0",
];

/// User agent sent with search engine HTTP requests
pub const HTTP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// `Accept-Language` header set on every rendered page
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// `Accept` header set on every rendered page
pub const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Default selectors that indicate a page has rendered real content
pub const DEFAULT_CONTENT_SELECTORS: [&str; 8] = [
    "body > div",
    "article",
    "main",
    "section",
    "p",
    "h1",
    "h2",
    "h3",
];

/// Maximum URL length accepted anywhere in the engine (after decoding)
pub const MAX_URL_LENGTH: usize = 2000;

// Placeholders substituted for degraded items
pub const CONTENT_UNAVAILABLE: &str = "Content unavailable";
pub const FAILED_TO_LOAD_PREFIX: &str = "Failed to load";
pub const INVALID_URL: &str = "Invalid URL";
pub const CONTENT_NOT_RETRIEVED: &str = "Content not retrieved";

/// Maximum search query length (chars, after decoding)
pub const MAX_QUERY_LENGTH: usize = 1000;

// Defaults for missing search result fields
pub const NO_TITLE: &str = "No title";
pub const NO_URL: &str = "No URL";
pub const NO_DESCRIPTION: &str = "No description";
