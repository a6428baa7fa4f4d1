//! Block-aware plain text rendering of a DOM subtree

use scraper::{ElementRef, Node};

/// Tags that get their own line. `a` is included so link text never runs
/// into the surrounding sentence.
const BLOCK_TAGS: [&str; 9] = ["section", "article", "main", "h1", "h2", "h3", "ul", "ol", "a"];

/// Attributes whose values carry visible text on some widgets
const TEXT_ATTRIBUTES: [&str; 2] = ["data-value", "data-tooltip"];

/// Render `element` as plain text
///
/// Text children are trimmed and followed by a space. Element children are
/// rendered recursively together with their text attributes; block tags are
/// wrapped in newlines, everything else is inlined. The result is trimmed
/// but otherwise not normalized (see [`super::clean`]).
pub fn extract_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push_str(trimmed);
                    out.push(' ');
                }
            }
            Node::Element(_) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let combined = element_text(child_element);
                if combined.is_empty() {
                    continue;
                }
                if BLOCK_TAGS.contains(&child_element.value().name()) {
                    out.push('\n');
                    out.push_str(&combined);
                    out.push('\n');
                } else {
                    out.push_str(&combined);
                    out.push(' ');
                }
            }
            _ => {}
        }
    }

    out.trim().to_string()
}

/// Recursive text plus attribute text, space separated
fn element_text(element: ElementRef<'_>) -> String {
    let inner = extract_text(element);
    let attrs = TEXT_ATTRIBUTES
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .filter(|value| !value.is_empty());

    std::iter::once(inner.as_str())
        .filter(|text| !text.is_empty())
        .chain(attrs)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn body_text(html: &str) -> String {
        let document = Html::parse_document(html);
        let body = Selector::parse("body").expect("body selector");
        let root = document.select(&body).next().expect("document has a body");
        extract_text(root)
    }

    #[test]
    fn inline_elements_share_a_line() {
        assert_eq!(body_text("<body><span>Hello</span><b>world</b></body>"), "Hello world");
    }

    #[test]
    fn block_elements_get_their_own_line() {
        let text = body_text("<body>Intro<h2>Title</h2>after</body>");
        assert_eq!(text, "Intro \nTitle\nafter");
    }

    #[test]
    fn links_are_block_like() {
        let text = body_text(r#"<body>see<a href="/x">the docs</a>now</body>"#);
        assert_eq!(text, "see \nthe docs\nnow");
    }

    #[test]
    fn includes_data_attributes() {
        let text = body_text(
            r#"<body><span data-value="42" data-tooltip="answer">Value</span></body>"#,
        );
        assert_eq!(text, "Value 42 answer");
    }

    #[test]
    fn attribute_only_elements_contribute() {
        assert_eq!(body_text(r#"<body><i data-tooltip="tip"></i></body>"#), "tip");
    }

    #[test]
    fn empty_elements_are_skipped() {
        assert_eq!(body_text("<body><div>  </div><p></p>text</body>"), "text");
    }
}
