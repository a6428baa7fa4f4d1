//! Headless page rendering
//!
//! The rest of the engine only sees the [`PageRenderer`] capability: a URL
//! goes in, fully rendered HTML comes out. [`ChromeRenderer`] is the real
//! implementation; tests substitute fakes that return canned HTML or errors.

mod page_load;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::BrowserConfig;
use crate::browser::{BrowserError, BrowserResult, launch_session};
use crate::utils::constants::{DEFAULT_CONTENT_SELECTORS, DEFAULT_USER_AGENTS, HTTP_USER_AGENT};
use crate::utils::{ConfigError, retry_linear, validate_navigation_timeout, validate_selector_timeout};

/// Turns a URL into rendered HTML
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render `url` and return the final HTML, or `RenderFailed` once the
    /// implementation's retry budget is spent
    async fn render(&self, url: &str) -> BrowserResult<String>;
}

/// Timing, retry and fingerprint settings for headless renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Pool of user agents; one is picked at random per session
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Selectors whose presence means real content has rendered.
    /// Tuned empirically; sites with unusual markup may need additions.
    #[serde(default = "default_content_selectors")]
    pub content_selectors: Vec<String>,

    /// Upper bound for navigation + network quiet (milliseconds)
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Upper bound for the content selector wait (milliseconds)
    #[serde(default = "default_selector_timeout_ms")]
    pub selector_timeout_ms: u64,

    /// Window with no new network resources that counts as idle (milliseconds)
    #[serde(default = "default_network_idle_ms")]
    pub network_idle_ms: u64,

    /// Delay after scrolling to let lazy content load (milliseconds)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Total render attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff unit: attempt `n` waits `n * retry_base_delay_ms`
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// HTML shorter than this (in chars) counts as a failed render
    #[serde(default = "default_min_html_len")]
    pub min_html_len: usize,
}

fn default_user_agents() -> Vec<String> {
    DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_string()).collect()
}
fn default_content_selectors() -> Vec<String> {
    DEFAULT_CONTENT_SELECTORS.iter().map(|s| (*s).to_string()).collect()
}
fn default_navigation_timeout_ms() -> u64 {
    90_000
}
fn default_selector_timeout_ms() -> u64 {
    10_000
}
fn default_network_idle_ms() -> u64 {
    500
}
fn default_settle_delay_ms() -> u64 {
    5_000
}
fn default_max_attempts() -> u32 {
    2
}
fn default_retry_base_delay_ms() -> u64 {
    2_000
}
fn default_min_html_len() -> usize {
    100
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            user_agents: default_user_agents(),
            content_selectors: default_content_selectors(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            selector_timeout_ms: default_selector_timeout_ms(),
            network_idle_ms: default_network_idle_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            min_html_len: default_min_html_len(),
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_navigation_timeout("renderer.navigation_timeout_ms", self.navigation_timeout_ms)?;
        validate_selector_timeout("renderer.selector_timeout_ms", self.selector_timeout_ms)?;
        if self.max_attempts == 0 {
            return Err(ConfigError::Zero("renderer.max_attempts"));
        }
        if self.user_agents.is_empty() {
            return Err(ConfigError::Empty("renderer.user_agents"));
        }
        Ok(())
    }

    fn pick_user_agent(&self) -> String {
        if self.user_agents.is_empty() {
            return HTTP_USER_AGENT.to_string();
        }
        let index = rand::rng().random_range(0..self.user_agents.len());
        self.user_agents[index].clone()
    }
}

/// Renders pages in a fresh headless Chrome session per attempt
///
/// No browser is shared between renders or between calls: each attempt
/// launches, renders, and tears down its own process and profile.
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    browser: BrowserConfig,
    config: RendererConfig,
}

impl ChromeRenderer {
    pub fn new(browser: BrowserConfig, config: RendererConfig) -> Self {
        Self { browser, config }
    }

    /// One full attempt: launch, load, capture, tear down
    async fn render_once(&self, url: &str) -> BrowserResult<String> {
        let user_agent = self.config.pick_user_agent();
        debug!("Rendering {} as '{}'", url, user_agent);

        let session = launch_session(&self.browser, &user_agent)
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("{e:#}")))?;

        let outcome = page_load::load_rendered_html(&session, url, &user_agent, &self.config).await;
        session.shutdown().await;

        let html = outcome?;
        let len = html.chars().count();
        if len < self.config.min_html_len {
            return Err(BrowserError::HtmlTooShort(len));
        }
        Ok(html)
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> BrowserResult<String> {
        let attempts = self.config.max_attempts.max(1);
        let base_delay = Duration::from_millis(self.config.retry_base_delay_ms);

        retry_linear(attempts, base_delay, |attempt| async move {
            debug!("Render attempt {}/{} for {}", attempt, attempts, url);
            self.render_once(url).await
        })
        .await
        .map_err(|e| {
            error!("Giving up on {} after {} attempt(s): {}", url, attempts, e);
            BrowserError::RenderFailed {
                url: url.to_string(),
                attempts,
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_budgets() {
        let config = RendererConfig::default();
        assert_eq!(config.navigation_timeout_ms, 90_000);
        assert_eq!(config.selector_timeout_ms, 10_000);
        assert_eq!(config.settle_delay_ms, 5_000);
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.user_agents.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn picks_agent_from_pool() {
        let config = RendererConfig {
            user_agents: vec!["agent-a".into(), "agent-b".into()],
            ..RendererConfig::default()
        };
        for _ in 0..20 {
            let agent = config.pick_user_agent();
            assert!(agent == "agent-a" || agent == "agent-b");
        }
    }

    #[test]
    fn rejects_zero_attempts() {
        let config = RendererConfig {
            max_attempts: 0,
            ..RendererConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Zero("renderer.max_attempts")));
    }
}
