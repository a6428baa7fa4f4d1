//! Link following: extract the page behind every search result

use tracing::{debug, info, warn};
use url::Url;

use super::types::SearchResultItem;
use crate::page_extractor::PageContentExtractor;
use crate::utils::constants::{FAILED_TO_LOAD_PREFIX, INVALID_URL, NO_URL};
use crate::utils::url::percent_decode_lenient;
use crate::utils::{Degraded, run_bounded};

/// Resolve a result link against the search engine's base URL
///
/// Only `http` and `https` targets are followed.
pub fn resolve_result_url(raw: &str, base: &Url) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw == NO_URL {
        return None;
    }
    let resolved = base.join(&percent_decode_lenient(raw)).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

/// Fill `content` on every item, one extraction per item over a bounded pool
///
/// Failures stay on their own item as `Invalid URL` or `Failed to load: ...`.
pub async fn follow_links(
    mut items: Vec<SearchResultItem>,
    base: &Url,
    extractor: &PageContentExtractor,
    width: usize,
    max_bytes: usize,
) -> Vec<SearchResultItem> {
    let targets: Vec<Option<Url>> = items
        .iter()
        .map(|item| {
            let resolved = resolve_result_url(&item.url, base);
            if resolved.is_none() {
                debug!("Not following result link {:?}", item.url);
            }
            resolved
        })
        .collect();

    info!("Following {} result link(s) with {} worker(s)", items.len(), width);

    let extractor = extractor.clone();
    let outcomes = run_bounded(targets, width, move |target: Option<Url>| {
        let extractor = extractor.clone();
        async move {
            let url = target.ok_or(Degraded::InvalidUrl)?;
            Ok(extractor.extract_page(url.as_str(), max_bytes).await)
        }
    })
    .await;

    for (item, outcome) in items.iter_mut().zip(outcomes) {
        item.content = Some(match outcome {
            Ok(content) => content,
            Err(Degraded::InvalidUrl) => INVALID_URL.to_string(),
            Err(e) => {
                warn!("Following {} degraded: {}", item.url, e);
                format!("{FAILED_TO_LOAD_PREFIX}: {e}")
            }
        });
    }

    items
}
