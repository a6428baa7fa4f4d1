//! HTML search mode: result cards parsed from a rendered results page

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::types::SearchResultItem;
use crate::page_extractor::clean;
use crate::utils::constants::{NO_DESCRIPTION, NO_TITLE, NO_URL};

/// Result card container
pub const SEARCH_RESULT_SELECTOR: &str = "#urls > .result";

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("BUG: hardcoded search result selector is invalid")
}

static RESULT_CARD: Lazy<Selector> = Lazy::new(|| selector(SEARCH_RESULT_SELECTOR));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h3"));
static TITLE_CLASS: Lazy<Selector> = Lazy::new(|| selector(".title"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static URL_CLASS: Lazy<Selector> = Lazy::new(|| selector(".url"));
static CONTENT_CLASS: Lazy<Selector> = Lazy::new(|| selector(".content"));
static DESCRIPTION_CLASS: Lazy<Selector> = Lazy::new(|| selector(".description"));

/// Parse up to `limit` result cards, in page order
pub fn parse_result_cards(html: &str, limit: usize) -> Vec<SearchResultItem> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_CARD)
        .take(limit)
        .map(|card| {
            let title = first_text(card, &HEADING)
                .or_else(|| first_text(card, &TITLE_CLASS))
                .unwrap_or_else(|| NO_TITLE.to_string());

            let url = card
                .select(&LINK)
                .filter_map(|a| a.value().attr("href"))
                .map(str::trim)
                .find(|href| !href.is_empty())
                .map(str::to_string)
                .or_else(|| first_text(card, &URL_CLASS))
                .unwrap_or_else(|| NO_URL.to_string());

            let description = first_text(card, &CONTENT_CLASS)
                .or_else(|| first_text(card, &DESCRIPTION_CLASS))
                .unwrap_or_else(|| NO_DESCRIPTION.to_string());

            SearchResultItem {
                title,
                url,
                description: clean(&description),
                content: None,
            }
        })
        .collect()
}

/// Trimmed text of the first match, `None` when absent or blank
fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}
