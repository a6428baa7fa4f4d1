//! JSON search mode: one HTTP GET, results mapped from a `results` array

use std::time::Duration;

use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, info};

use super::types::{SearchConfig, SearchError, SearchResultItem};
use crate::page_extractor::clean;
use crate::utils::constants::{HTTP_USER_AGENT, NO_DESCRIPTION, NO_TITLE, NO_URL};
use crate::utils::retry_linear_if;

pub struct JsonSearchClient {
    client: reqwest::Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl JsonSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .user_agent(HTTP_USER_AGENT)
            .timeout(Duration::from_millis(config.search_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            max_attempts: config.http_max_retries.saturating_add(1),
            retry_delay: Duration::from_millis(config.http_retry_delay_ms),
        })
    }

    /// GET `url` and map up to `limit` entries of its `results` array
    pub async fn search(&self, url: &str, limit: usize) -> Result<Vec<SearchResultItem>, SearchError> {
        let body = retry_linear_if(
            self.max_attempts,
            self.retry_delay,
            SearchError::is_retryable,
            |attempt| async move {
                debug!("JSON search attempt {} for {}", attempt, url);
                self.fetch_once(url).await
            },
        )
        .await?;

        let items = map_results(&body, limit);
        info!("JSON search returned {} result(s)", items.len());
        Ok(items)
    }

    async fn fetch_once(&self, url: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| SearchError::InvalidJson(e.to_string()))
    }
}

/// Map a search engine response body; anything but a `results` array is empty
pub fn map_results(body: &Value, limit: usize) -> Vec<SearchResultItem> {
    let Some(entries) = body.get("results").and_then(Value::as_array) else {
        debug!("Search response has no results array");
        return Vec::new();
    };

    entries
        .iter()
        .take(limit)
        .map(|entry| SearchResultItem {
            title: text_field(entry, "title").unwrap_or(NO_TITLE).to_string(),
            url: text_field(entry, "url").unwrap_or(NO_URL).to_string(),
            description: clean(
                text_field(entry, "content")
                    .or_else(|| text_field(entry, "snippet"))
                    .unwrap_or(NO_DESCRIPTION),
            ),
            content: None,
        })
        .collect()
}

/// Trimmed non-empty string field
fn text_field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
