//! Page content extraction against a fake renderer

mod common;

use async_trait::async_trait;
use common::{FakeRenderer, article_html, fast_config};
use kodegen_tools_webfetch::constants::CONTENT_UNAVAILABLE;
use kodegen_tools_webfetch::{
    BrowserError, BrowserResult, ContentEngine, ExtractorConfig, PageContentExtractor,
    PageRenderer, retry_linear,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[tokio::test]
async fn extracts_article_text_without_boilerplate() {
    let url = "https://blog.example/post";
    let renderer = Arc::new(FakeRenderer::new().page(
        url,
        article_html("Async Rust", "Futures are lazy and do nothing unless polled."),
    ));
    let engine = ContentEngine::with_renderer(fast_config(), renderer.clone()).expect("engine builds");

    let text = engine.extract_page(url, 8192).await;

    assert!(text.contains("Async Rust"));
    assert!(text.contains("Futures are lazy and do nothing unless polled."));
    assert!(!text.contains("About us"));
    assert!(!text.contains("Copyright"));
    assert_eq!(renderer.calls(), 1);
}

#[tokio::test]
async fn joins_distinct_blocks_with_separator() {
    let url = "https://docs.example/guide";
    let html = r#"<html><body>
        <h2>Installation steps</h2>
        <p>Run the installer first.</p>
        <p>Run the installer first.</p>
    </body></html>"#;
    let renderer = Arc::new(FakeRenderer::new().page(url, html));
    let engine = ContentEngine::with_renderer(fast_config(), renderer).expect("engine builds");

    let text = engine.extract_page(url, 8192).await;

    assert_eq!(text, "Installation steps\n---\nRun the installer first.");
}

#[tokio::test]
async fn render_failure_yields_sentinel() {
    let url = "https://down.example/";
    let renderer = Arc::new(FakeRenderer::new().failing(url, "net::ERR_CONNECTION_REFUSED"));
    let engine = ContentEngine::with_renderer(fast_config(), renderer).expect("engine builds");

    assert_eq!(engine.extract_page(url, 8192).await, CONTENT_UNAVAILABLE);
}

#[tokio::test]
async fn sentinel_respects_byte_budget() {
    let url = "https://down.example/";
    let renderer = Arc::new(FakeRenderer::new().failing(url, "timeout"));
    let engine = ContentEngine::with_renderer(fast_config(), renderer).expect("engine builds");

    for budget in [1, 5, 10, 15] {
        let text = engine.extract_page(url, budget).await;
        assert!(text.len() <= budget + 3, "{} bytes for budget {}", text.len(), budget);
        assert!(CONTENT_UNAVAILABLE.starts_with(&text));
    }
}

#[tokio::test]
async fn output_respects_byte_budget() {
    let url = "https://long.example/";
    let body = "lorem ipsum dolor sit amet ".repeat(200);
    let renderer = Arc::new(FakeRenderer::new().page(url, article_html("Long", &body)));
    let engine = ContentEngine::with_renderer(fast_config(), renderer).expect("engine builds");

    for budget in [64, 100, 2048] {
        let text = engine.extract_page(url, budget).await;
        assert!(text.len() <= budget + 3, "{} bytes for budget {}", text.len(), budget);
        assert!(text.ends_with("..."), "word-boundary cut expected for budget {budget}");
    }
}

#[tokio::test]
async fn percent_encoded_url_is_decoded_before_render() {
    let renderer = Arc::new(FakeRenderer::new().page(
        "https://wiki.example/a b",
        article_html("Spaced", "A page whose path has a space in it."),
    ));
    let engine = ContentEngine::with_renderer(fast_config(), renderer.clone()).expect("engine builds");

    let text = engine.extract_page("https://wiki.example/a%20b", 8192).await;

    assert!(text.contains("A page whose path has a space in it."));
    assert_eq!(renderer.rendered_urls(), vec!["https://wiki.example/a b".to_string()]);
}

/// Fails its first `failures` attempts, retrying like the Chrome renderer
struct FlakyRenderer {
    failures: u32,
    max_attempts: u32,
    attempts: AtomicU32,
}

#[async_trait]
impl PageRenderer for FlakyRenderer {
    async fn render(&self, url: &str) -> BrowserResult<String> {
        retry_linear(self.max_attempts, Duration::from_millis(1), |_| async move {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                Err(BrowserError::HtmlTooShort(12))
            } else {
                Ok(article_html("Recovered", "Rendered after transient failures."))
            }
        })
        .await
        .map_err(|e| BrowserError::RenderFailed {
            url: url.to_string(),
            attempts: self.max_attempts,
            reason: e.to_string(),
        })
    }
}

async fn extract_with_flaky(failures: u32, max_attempts: u32) -> (String, u32) {
    let renderer = Arc::new(FlakyRenderer {
        failures,
        max_attempts,
        attempts: AtomicU32::new(0),
    });
    let extractor = PageContentExtractor::new(renderer.clone(), ExtractorConfig::default());
    let text = extractor.extract_page("https://flaky.example/", 8192).await;
    (text, renderer.attempts.load(Ordering::SeqCst))
}

#[tokio::test]
async fn two_failures_exhaust_two_attempts() {
    let (text, attempts) = extract_with_flaky(2, 2).await;
    assert_eq!(text, CONTENT_UNAVAILABLE);
    assert_eq!(attempts, 2);
}

#[tokio::test]
async fn two_failures_then_success_within_three_attempts() {
    let (text, attempts) = extract_with_flaky(2, 3).await;
    assert!(text.contains("Rendered after transient failures."));
    assert_eq!(attempts, 3);
}

#[tokio::test]
async fn try_extract_reports_degradation_reason() {
    let url = "https://down.example/";
    let renderer = Arc::new(FakeRenderer::new().failing(url, "timeout"));
    let extractor = PageContentExtractor::new(renderer, ExtractorConfig::default());

    let err = extractor
        .try_extract_page(url, 100)
        .await
        .expect_err("render failure surfaces as Degraded");
    assert!(err.to_string().contains("timeout"));
}
