//! Batch preview fetching for user supplied links

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::page_extractor::PageContentExtractor;
use crate::utils::constants::FAILED_TO_LOAD_PREFIX;
use crate::utils::url::accept_candidate_url;
use crate::utils::{ConfigError, run_bounded};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Byte budget per link preview
    #[serde(default = "default_preview_bytes")]
    pub preview_bytes: usize,

    /// Maximum renders in flight per batch
    #[serde(default = "default_pool_width")]
    pub pool_width: usize,
}

fn default_preview_bytes() -> usize {
    2048
}

pub(crate) fn default_pool_width() -> usize {
    3
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            preview_bytes: default_preview_bytes(),
            pool_width: default_pool_width(),
        }
    }
}

impl LinkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview_bytes == 0 {
            return Err(ConfigError::Zero("links.preview_bytes"));
        }
        if self.pool_width == 0 {
            return Err(ConfigError::Zero("links.pool_width"));
        }
        Ok(())
    }
}

/// Combined previews, or an error when there was nothing to fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkContent {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LinkContent {
    fn failed(reason: &str) -> Self {
        Self {
            content: String::new(),
            error: Some(format!("Failed to load content: {reason}")),
        }
    }
}

pub struct LinkFetcher {
    extractor: PageContentExtractor,
    config: LinkConfig,
}

impl LinkFetcher {
    pub fn new(extractor: PageContentExtractor, config: LinkConfig) -> Self {
        Self { extractor, config }
    }

    /// Fetch a short preview of every valid URL in `urls`
    ///
    /// Only an empty input or an input without a single valid URL produces
    /// `error`. Once at least one URL is valid the call always returns
    /// content; a URL that fails degrades to a `Failed to load: ...` block.
    pub async fn fetch_links(&self, urls: &[String]) -> LinkContent {
        if urls.is_empty() {
            warn!("fetch_links called without URLs");
            return LinkContent::failed("no URLs provided");
        }

        let valid: Vec<String> = urls
            .iter()
            .filter_map(|raw| {
                let accepted = accept_candidate_url(raw);
                if accepted.is_none() {
                    debug!("Dropping invalid link: {:?}", raw);
                }
                accepted
            })
            .collect();

        if valid.is_empty() {
            warn!("None of the {} supplied links is a valid http(s) URL", urls.len());
            return LinkContent::failed("no valid URLs");
        }

        info!(
            "Fetching {} link preview(s) with {} worker(s)",
            valid.len(),
            self.config.pool_width
        );

        let extractor = self.extractor.clone();
        let preview_bytes = self.config.preview_bytes;
        let outcomes = run_bounded(valid.clone(), self.config.pool_width, move |url: String| {
            let extractor = extractor.clone();
            async move { Ok(extractor.extract_page(&url, preview_bytes).await) }
        })
        .await;

        let content = valid
            .iter()
            .zip(outcomes)
            .map(|(url, outcome)| {
                let text = outcome.unwrap_or_else(|e| {
                    warn!("Link {} degraded: {}", url, e);
                    format!("{FAILED_TO_LOAD_PREFIX}: {e}")
                });
                format!("Content from {url}:\n{text}")
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        LinkContent {
            content,
            error: None,
        }
    }
}
