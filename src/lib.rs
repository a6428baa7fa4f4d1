//! Content acquisition and search aggregation for LLM prompts
//!
//! Turns a search query or a list of raw URLs into clean, bounded,
//! de-duplicated text. Pages are rendered headlessly via chromiumoxide,
//! reduced to block-level text, and fetched over a bounded worker pool so
//! one slow or broken page never sinks a batch.

mod browser;
pub mod browser_setup;
pub mod link_fetcher;
pub mod page_extractor;
pub mod relevance;
pub mod renderer;
mod utils;
pub mod web_search;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub use browser::{
    BrowserError, BrowserResult, BrowserWrapper, download_managed_browser,
    find_browser_executable, launch_session,
};
pub use link_fetcher::{LinkConfig, LinkContent, LinkFetcher};
pub use page_extractor::{ExtractorConfig, PageContentExtractor, clean, extract_from_html, extract_text};
pub use relevance::{Embedder, OllamaEmbedder, RelevanceConfig, RelevanceFilter};
pub use renderer::{ChromeRenderer, PageRenderer, RendererConfig};
pub use utils::constants;
pub use utils::{ConfigError, Degraded, retry_linear, retry_linear_if, run_bounded};
pub use web_search::{
    SearchAggregator, SearchConfig, SearchError, SearchFormat, SearchRequest, SearchResponse,
    SearchResultItem,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub renderer: RendererConfig,

    #[serde(default)]
    pub extractor: ExtractorConfig,

    #[serde(default)]
    pub links: LinkConfig,

    #[serde(default)]
    pub search: SearchConfig,

    /// Embedding relevance filter for search results; off when absent
    #[serde(default)]
    pub relevance: Option<RelevanceConfig>,
}

/// Browser security and launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

fn default_headless() -> bool {
    true
}

fn default_disable_security() -> bool {
    false // SECURE BY DEFAULT
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: default_disable_security(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Config {
    /// Check every section; the first invalid value wins
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.browser.window.width == 0 || self.browser.window.height == 0 {
            return Err(ConfigError::Zero("browser.window"));
        }
        self.renderer.validate()?;
        self.extractor.validate()?;
        self.links.validate()?;
        self.search.validate()?;
        if let Some(relevance) = &self.relevance {
            relevance.validate()?;
        }
        Ok(())
    }
}

/// Load config from config.yaml in package root
pub fn load_yaml_config() -> anyhow::Result<Config> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml");

    if config_path.exists() {
        load_yaml_config_from(&config_path)
    } else {
        Ok(Config::default())
    }
}

/// Load and validate config from a specific YAML file
pub fn load_yaml_config_from(path: &Path) -> anyhow::Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Entry point wiring renderer, extractor, link fetcher and search together
pub struct ContentEngine {
    extractor: PageContentExtractor,
    links: LinkFetcher,
    search: SearchAggregator,
}

impl ContentEngine {
    /// Build an engine that renders with headless Chrome
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let renderer = ChromeRenderer::new(config.browser.clone(), config.renderer.clone());
        Self::with_renderer(config, Arc::new(renderer))
    }

    /// Build an engine around any renderer
    pub fn with_renderer(config: Config, renderer: Arc<dyn PageRenderer>) -> anyhow::Result<Self> {
        config.validate()?;

        let relevance = match &config.relevance {
            Some(relevance) => {
                info!(
                    "Relevance filter enabled ({} @ {}, threshold {})",
                    relevance.model, relevance.endpoint, relevance.threshold
                );
                Some(RelevanceFilter::from_config(relevance).context("Failed to build embedder")?)
            }
            None => None,
        };

        Self::assemble(config, renderer, relevance)
    }

    /// Build an engine with an explicit relevance filter
    pub fn with_relevance(
        config: Config,
        renderer: Arc<dyn PageRenderer>,
        relevance: RelevanceFilter,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        Self::assemble(config, renderer, Some(relevance))
    }

    fn assemble(
        config: Config,
        renderer: Arc<dyn PageRenderer>,
        relevance: Option<RelevanceFilter>,
    ) -> anyhow::Result<Self> {
        let extractor = PageContentExtractor::new(renderer, config.extractor);
        let links = LinkFetcher::new(extractor.clone(), config.links);
        let search = SearchAggregator::new(extractor.clone(), config.search, relevance)
            .context("Failed to build search client")?;

        Ok(Self {
            extractor,
            links,
            search,
        })
    }

    /// Preview every valid URL; see [`LinkFetcher::fetch_links`]
    pub async fn fetch_link_content(&self, urls: &[String]) -> LinkContent {
        self.links.fetch_links(urls).await
    }

    /// Search and return the JSON encoded result list or error object
    pub async fn search(
        &self,
        query: &str,
        url: &str,
        format: &str,
        limit: Option<i64>,
        follow_links: bool,
    ) -> SearchResponse {
        let request = SearchRequest {
            query: query.to_string(),
            url_template: url.to_string(),
            format: format.to_string(),
            limit,
            follow_links,
        };
        self.search_request(&request).await
    }

    pub async fn search_request(&self, request: &SearchRequest) -> SearchResponse {
        SearchResponse {
            results: self.search.search(request).await,
        }
    }

    /// Extract one page; degrades to "Content unavailable"
    pub async fn extract_page(&self, url: &str, max_bytes: usize) -> String {
        self.extractor.extract_page(url, max_bytes).await
    }
}
