//! Rendered page to bounded plain text

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{PageMeta, clean, extract_text};
use crate::renderer::PageRenderer;
use crate::utils::constants::CONTENT_UNAVAILABLE;
use crate::utils::url::percent_decode_lenient;
use crate::utils::{ConfigError, Degraded};

/// Noise removed before any text is collected
static EXCLUDED: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(concat!(
        "script, style, noscript, iframe, link, meta, head, header, footer, nav, form, button, svg, ",
        ".breadcrumbs, .ads, .news, .footer-links, .social, ",
        r#"[style*="display: none"], [style*="display:none"], [hidden]"#,
    ))
    .expect("BUG: hardcoded exclusion selector is invalid")
});

static BLOCK_CANDIDATES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("section, article, main, h1, h2, h3, ul, ol, a, p, div")
        .expect("BUG: hardcoded block candidate selector is invalid")
});

static BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("BUG: hardcoded CSS selector 'body' is invalid"));

/// Blocks with this many chars or fewer are ignored
const MIN_BLOCK_CHARS: usize = 5;

const BLOCK_SEPARATOR: &str = "\n---\n";
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Byte budget for full page extraction (search link following)
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
}

fn default_max_content_bytes() -> usize {
    8192
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: default_max_content_bytes(),
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_content_bytes == 0 {
            return Err(ConfigError::Zero("extractor.max_content_bytes"));
        }
        Ok(())
    }
}

/// Renders a page and reduces it to de-duplicated text blocks
#[derive(Clone)]
pub struct PageContentExtractor {
    renderer: Arc<dyn PageRenderer>,
    config: ExtractorConfig,
}

impl PageContentExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>, config: ExtractorConfig) -> Self {
        Self { renderer, config }
    }

    pub fn renderer(&self) -> &Arc<dyn PageRenderer> {
        &self.renderer
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract `url`, reporting why nothing usable came back
    pub async fn try_extract_page(&self, url: &str, max_bytes: usize) -> Result<String, Degraded> {
        let url = percent_decode_lenient(url);
        let html = self.renderer.render(&url).await?;

        let content = page_text(&html).ok_or(Degraded::NoContent)?;
        let content = truncate_to_budget(&content, max_bytes);
        debug!("Extracted {} bytes from {}", content.len(), url);
        Ok(content)
    }

    /// Extract `url`; any failure yields the "Content unavailable" sentinel
    pub async fn extract_page(&self, url: &str, max_bytes: usize) -> String {
        match self.try_extract_page(url, max_bytes).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Extraction degraded for {}: {}", url, e);
                truncate_to_budget(CONTENT_UNAVAILABLE, max_bytes)
            }
        }
    }
}

/// Reduce already rendered HTML to bounded text
///
/// Never empty: falls back to the "Content unavailable" sentinel.
pub fn extract_from_html(html: &str, max_bytes: usize) -> String {
    let content = page_text(html).unwrap_or_else(|| CONTENT_UNAVAILABLE.to_string());
    truncate_to_budget(&content, max_bytes)
}

/// Blocks, then meta description, og description, whole body, raw body text
fn page_text(html: &str) -> Option<String> {
    let mut document = Html::parse_document(html);
    let meta = PageMeta::harvest(&document);
    remove_noise(&mut document);

    let body = document.select(&BODY).next();
    body.and_then(collect_blocks)
        .or_else(|| meta.best_description())
        .or_else(|| body.map(|b| clean(&extract_text(b))).filter(|t| !t.is_empty()))
        .or_else(|| body.map(|b| clean(&b.text().collect::<String>())).filter(|t| !t.is_empty()))
}

fn remove_noise(document: &mut Html) {
    let ids: Vec<_> = document.select(&EXCLUDED).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Cleaned candidate blocks in document order, exact duplicates dropped
fn collect_blocks(body: ElementRef<'_>) -> Option<String> {
    let mut seen = HashSet::new();
    let mut blocks = Vec::new();

    for candidate in body.select(&BLOCK_CANDIDATES) {
        let text = extract_text(candidate);
        if text.chars().count() <= MIN_BLOCK_CHARS {
            continue;
        }
        let cleaned = clean(&text);
        if !cleaned.is_empty() && seen.insert(cleaned.clone()) {
            blocks.push(cleaned);
        }
    }

    (!blocks.is_empty()).then(|| blocks.join(BLOCK_SEPARATOR))
}

/// Cut `content` to at most `max_bytes`, preferring a word break
///
/// If the last space of the cut window lies past 80% of the budget the
/// text ends there with `...`; otherwise the window is returned as is.
/// The result never exceeds `max_bytes + 3` bytes.
pub fn truncate_to_budget(content: &str, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content.to_string();
    }

    let mut cut = max_bytes;
    while !content.is_char_boundary(cut) {
        cut -= 1;
    }
    let window = &content[..cut];

    match window.rfind(' ') {
        Some(space) if space * 5 > max_bytes * 4 => format!("{}{}", &window[..space], ELLIPSIS),
        _ => window.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_untouched() {
        assert_eq!(truncate_to_budget("hello world", 100), "hello world");
    }

    #[test]
    fn cuts_at_late_space_with_ellipsis() {
        let content = "aaaaaaaaa bbbbbbbbbb";
        let out = truncate_to_budget(content, 11);
        assert_eq!(out, "aaaaaaaaa...");
        assert!(out.len() <= 11 + 3);
    }

    #[test]
    fn hard_cut_when_space_is_early() {
        let out = truncate_to_budget("ab cdefghijklmnop", 10);
        assert_eq!(out, "ab cdefghi");
    }

    #[test]
    fn never_splits_a_char() {
        let out = truncate_to_budget("ééééé", 5);
        assert_eq!(out, "éé");
    }

    #[test]
    fn collects_blocks_and_drops_noise() {
        let html = r#"<html><body>
            <nav><p>Navigation links here</p></nav>
            <article><p>First paragraph of text.</p></article>
            <p style="display:none">Hidden paragraph text</p>
            <footer><p>Footer boilerplate text</p></footer>
        </body></html>"#;
        let out = extract_from_html(html, 8192);
        assert!(out.contains("First paragraph of text."));
        assert!(!out.contains("Navigation"));
        assert!(!out.contains("Hidden"));
        assert!(!out.contains("Footer"));
    }

    #[test]
    fn duplicate_blocks_appear_once() {
        let html = "<html><body><p>Repeated block text</p><p>Repeated block text</p></body></html>";
        let out = extract_from_html(html, 8192);
        assert_eq!(out.matches("Repeated block text").count(), 1);
    }

    #[test]
    fn falls_back_to_meta_description() {
        let html = r#"<html><head><meta name="description" content="Meta summary"></head>
            <body><p>tiny</p></body></html>"#;
        assert_eq!(extract_from_html(html, 8192), "Meta summary");
    }

    #[test]
    fn falls_back_to_og_description() {
        let html = r#"<html><head><meta property="og:description" content="Social summary"></head>
            <body></body></html>"#;
        assert_eq!(extract_from_html(html, 8192), "Social summary");
    }

    #[test]
    fn falls_back_to_body_text() {
        let html = "<html><body><span>abc</span></body></html>";
        assert_eq!(extract_from_html(html, 8192), "abc");
    }

    #[test]
    fn sentinel_respects_tiny_budget() {
        let html = "<html><body></body></html>";
        assert_eq!(extract_from_html(html, 5), "Conte");
    }

    #[test]
    fn empty_page_yields_sentinel() {
        let html = "<html><body><script>var x = 1;</script></body></html>";
        assert_eq!(extract_from_html(html, 8192), CONTENT_UNAVAILABLE);
    }
}
