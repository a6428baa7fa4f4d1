//! Meta description harvesting
//!
//! Runs on the freshly parsed document, before noise removal detaches
//! `<head>` and `<meta>`, so the descriptions stay available as fallbacks.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::clean;

static META_DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="description"]"#)
        .expect("BUG: hardcoded meta description selector is invalid")
});

static OG_DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:description"]"#)
        .expect("BUG: hardcoded og:description selector is invalid")
});

/// Cleaned page descriptions, `None` when missing or blank
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub description: Option<String>,
    pub og_description: Option<String>,
}

impl PageMeta {
    pub fn harvest(document: &Html) -> Self {
        Self {
            description: meta_content(document, &META_DESCRIPTION),
            og_description: meta_content(document, &OG_DESCRIPTION),
        }
    }

    /// First available description, standard meta tag preferred
    pub fn best_description(self) -> Option<String> {
        self.description.or(self.og_description)
    }
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|meta| meta.value().attr("content"))
        .map(clean)
        .find(|content| !content.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harvests_both_descriptions() {
        let document = Html::parse_document(
            r#"<html><head>
                <meta name="description" content="  Plain   summary ">
                <meta property="og:description" content="Social summary">
            </head><body></body></html>"#,
        );
        let meta = PageMeta::harvest(&document);
        assert_eq!(meta.description.as_deref(), Some("Plain summary"));
        assert_eq!(meta.og_description.as_deref(), Some("Social summary"));
        assert_eq!(meta.best_description().as_deref(), Some("Plain summary"));
    }

    #[test]
    fn blank_description_falls_through_to_og() {
        let document = Html::parse_document(
            r#"<html><head>
                <meta name="description" content="   ">
                <meta property="og:description" content="Social summary">
            </head></html>"#,
        );
        let meta = PageMeta::harvest(&document);
        assert_eq!(meta.description, None);
        assert_eq!(meta.best_description().as_deref(), Some("Social summary"));
    }
}
