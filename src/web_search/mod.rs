//! Search aggregation over a caller supplied search engine
//!
//! One call validates the request, queries the engine in JSON or HTML mode,
//! optionally filters by relevance, optionally follows every result link and
//! finally serializes the list. Only validation and upstream failures become
//! an error payload; per-result failures degrade in place.
//!
//! # Architecture
//! - `types` - Data structures, errors and configuration
//! - `validation` - Request checks that run before any I/O
//! - `json` - HTTP leg of the JSON mode
//! - `html` - Result card parsing for the HTML mode
//! - `follow` - Link following over the bounded pool

mod follow;
mod html;
mod json;
mod types;
mod validation;

pub use follow::resolve_result_url;
pub use html::{SEARCH_RESULT_SELECTOR, parse_result_cards};
pub use json::map_results;
pub use types::{
    SearchConfig, SearchError, SearchFormat, SearchRequest, SearchResponse, SearchResultItem,
    ValidatedSearch, error_payload,
};
pub use validation::validate;

use tracing::{error, info};

use crate::page_extractor::PageContentExtractor;
use crate::relevance::RelevanceFilter;
use crate::utils::constants::{CONTENT_NOT_RETRIEVED, NO_DESCRIPTION, NO_TITLE, NO_URL};
use json::JsonSearchClient;

pub struct SearchAggregator {
    extractor: PageContentExtractor,
    json: JsonSearchClient,
    relevance: Option<RelevanceFilter>,
    config: SearchConfig,
}

impl SearchAggregator {
    pub fn new(
        extractor: PageContentExtractor,
        config: SearchConfig,
        relevance: Option<RelevanceFilter>,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            json: JsonSearchClient::new(&config)?,
            extractor,
            relevance,
            config,
        })
    }

    /// Run a search and return the JSON encoded result list or error object
    ///
    /// Never fails: every error is folded into
    /// `{"error":true,"message":"Search failed: ...","results":[]}`.
    pub async fn search(&self, request: &SearchRequest) -> String {
        match self.search_items(request).await {
            Ok(items) => serde_json::to_string(&items).unwrap_or_else(|e| {
                error!("Failed to encode search results: {}", e);
                error_payload(&SearchError::InvalidJson(e.to_string()))
            }),
            Err(e) => {
                error!("Search failed: {}", e);
                error_payload(&e)
            }
        }
    }

    /// Run a search and return the finalized items
    pub async fn search_items(&self, request: &SearchRequest) -> Result<Vec<SearchResultItem>, SearchError> {
        let search = validate(request, &self.config)?;
        let target = search.target_url();
        info!(
            "Searching '{}' ({} mode, limit {}, follow_links={})",
            search.query, search.format, search.limit, search.follow_links
        );

        let mut items = match search.format {
            SearchFormat::Json => self.json.search(&target, search.limit).await?,
            SearchFormat::Html => {
                let html = self.extractor.renderer().render(&target).await?;
                parse_result_cards(&html, search.limit)
            }
        };

        if let Some(filter) = &self.relevance {
            items = filter.filter(&search.query, items).await;
        }

        if search.follow_links && !items.is_empty() {
            items = follow::follow_links(
                items,
                &search.base_url,
                &self.extractor,
                self.config.pool_width,
                self.extractor.config().max_content_bytes,
            )
            .await;
        }

        Ok(finalize(items, search.follow_links))
    }
}

/// Backfill empty fields; with link following, every item gets content
pub fn finalize(items: Vec<SearchResultItem>, follow_links: bool) -> Vec<SearchResultItem> {
    items
        .into_iter()
        .map(|mut item| {
            backfill(&mut item.title, NO_TITLE);
            backfill(&mut item.url, NO_URL);
            backfill(&mut item.description, NO_DESCRIPTION);
            if follow_links && item.content.is_none() {
                item.content = Some(CONTENT_NOT_RETRIEVED.to_string());
            }
            item
        })
        .collect()
}

fn backfill(field: &mut String, default: &str) {
    if field.trim().is_empty() {
        *field = default.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_backfills_and_marks_missing_content() {
        let items = vec![SearchResultItem::default()];
        let done = finalize(items, true);
        assert_eq!(done[0].title, NO_TITLE);
        assert_eq!(done[0].url, NO_URL);
        assert_eq!(done[0].description, NO_DESCRIPTION);
        assert_eq!(done[0].content.as_deref(), Some(CONTENT_NOT_RETRIEVED));
    }

    #[test]
    fn finalize_leaves_content_absent_without_follow() {
        let done = finalize(vec![SearchResultItem::default()], false);
        assert_eq!(done[0].content, None);
    }
}
