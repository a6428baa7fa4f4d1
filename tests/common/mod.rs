//! Test utilities shared by the integration tests
//!
//! `FakeRenderer` stands in for headless Chrome: canned HTML or errors per
//! URL, optional delays, and counters for calls and peak concurrency.

use async_trait::async_trait;
use kodegen_tools_webfetch::{BrowserError, BrowserResult, Config, PageRenderer};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[allow(dead_code)]
#[derive(Clone)]
pub enum FakePage {
    Html(String),
    Fail(String),
    Slow(Duration, String),
    Panic,
}

#[derive(Default)]
pub struct FakeRenderer {
    pages: HashMap<String, FakePage>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    rendered: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), FakePage::Html(html.into()));
        self
    }

    pub fn failing(mut self, url: &str, reason: &str) -> Self {
        self.pages.insert(url.to_string(), FakePage::Fail(reason.to_string()));
        self
    }

    pub fn slow(mut self, url: &str, delay: Duration, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), FakePage::Slow(delay, html.into()));
        self
    }

    pub fn panicking(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), FakePage::Panic);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn rendered_urls(&self) -> Vec<String> {
        self.rendered.lock().expect("rendered list lock").clone()
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(&self, url: &str) -> BrowserResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rendered.lock().expect("rendered list lock").push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let page = self.pages.get(url).cloned();
        let outcome = match page {
            Some(FakePage::Html(html)) => Ok(html),
            Some(FakePage::Slow(delay, html)) => {
                tokio::time::sleep(delay).await;
                Ok(html)
            }
            Some(FakePage::Fail(reason)) => Err(BrowserError::RenderFailed {
                url: url.to_string(),
                attempts: 2,
                reason,
            }),
            Some(FakePage::Panic) => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                panic!("renderer exploded on {url}");
            }
            None => Err(BrowserError::RenderFailed {
                url: url.to_string(),
                attempts: 2,
                reason: "no such page".to_string(),
            }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// A content page whose main text is `body_text`
#[allow(dead_code)]
pub fn article_html(title: &str, body_text: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="description" content="Summary of {title}">
    <title>{title}</title>
</head>
<body>
    <nav><a href="/">Home</a><a href="/about">About us</a></nav>
    <article>
        <h1>{title}</h1>
        <p>{body_text}</p>
    </article>
    <footer><p>Copyright boilerplate</p></footer>
</body>
</html>"#
    )
}

/// Default config with retry delays shortened for tests
#[allow(dead_code)]
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.search.http_retry_delay_ms = 1;
    config.renderer.retry_base_delay_ms = 1;
    config
}
