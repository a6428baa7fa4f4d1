//! Data structures and configuration for search aggregation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::browser::BrowserError;
use crate::link_fetcher::default_pool_width;
use crate::utils::ConfigError;

// =============================================================================
// Errors
// =============================================================================

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{0}")]
    Validation(String),

    #[error("Search engine returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to render search page: {0}")]
    Render(#[from] BrowserError),
}

impl SearchError {
    /// Gateway errors are worth another try; everything else is final
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::UpstreamStatus { status: 502..=504 })
    }
}

// =============================================================================
// Request / response
// =============================================================================

/// Upstream response format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFormat {
    Json,
    Html,
}

impl FromStr for SearchFormat {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(SearchFormat::Json),
            "html" => Ok(SearchFormat::Html),
            other => Err(SearchError::Validation(format!(
                "Unsupported format '{other}', expected 'json' or 'html'"
            ))),
        }
    }
}

impl fmt::Display for SearchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchFormat::Json => f.write_str("json"),
            SearchFormat::Html => f.write_str("html"),
        }
    }
}

/// Raw search request as received from the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text, possibly percent-encoded
    pub query: String,
    /// Search URL with one `%s` placeholder for the encoded query
    pub url_template: String,
    /// `json` or `html`
    pub format: String,
    /// Number of results; defaults to 3, clamped to `[1, 100]`
    #[serde(default)]
    pub limit: Option<i64>,
    /// Extract the page behind every result
    #[serde(default)]
    pub follow_links: bool,
}

/// A request that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedSearch {
    pub query: String,
    pub url_template: String,
    pub format: SearchFormat,
    pub limit: usize,
    pub follow_links: bool,
    /// The template with `%s` removed; relative result links resolve against it
    pub base_url: Url,
}

impl ValidatedSearch {
    /// The template with the percent-encoded query in the first `%s`
    pub fn target_url(&self) -> String {
        self.url_template
            .replacen("%s", &urlencoding::encode(&self.query), 1)
    }
}

/// One search result; `content` only when link following was requested
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub url: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// What `search` hands back: a JSON encoded list or error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: String,
}

/// `{"error":true,"message":"Search failed: ...","results":[]}`
pub fn error_payload(err: &SearchError) -> String {
    serde_json::json!({
        "error": true,
        "message": format!("Search failed: {err}"),
        "results": [],
    })
    .to_string()
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Whole-request timeout for JSON search calls (milliseconds)
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,

    /// Retries after the first attempt on 502/503/504
    #[serde(default = "default_http_max_retries")]
    pub http_max_retries: u32,

    /// Linear backoff unit for those retries (milliseconds)
    #[serde(default = "default_http_retry_delay_ms")]
    pub http_retry_delay_ms: u64,

    /// Maximum link-follow extractions in flight
    #[serde(default = "default_pool_width")]
    pub pool_width: usize,
}

fn default_limit() -> usize {
    3
}
fn default_max_limit() -> usize {
    100
}
fn default_search_timeout_ms() -> u64 {
    5_000
}
fn default_http_max_retries() -> u32 {
    2
}
fn default_http_retry_delay_ms() -> u64 {
    500
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            search_timeout_ms: default_search_timeout_ms(),
            http_max_retries: default_http_max_retries(),
            http_retry_delay_ms: default_http_retry_delay_ms(),
            pool_width: default_pool_width(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit == 0 {
            return Err(ConfigError::Zero("search.max_limit"));
        }
        if self.default_limit == 0 {
            return Err(ConfigError::Zero("search.default_limit"));
        }
        if self.search_timeout_ms == 0 {
            return Err(ConfigError::Zero("search.search_timeout_ms"));
        }
        if self.pool_width == 0 {
            return Err(ConfigError::Zero("search.pool_width"));
        }
        Ok(())
    }
}
