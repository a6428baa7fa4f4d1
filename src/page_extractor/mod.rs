//! Page content extraction
//!
//! Rendered HTML is reduced to plain text in three layers: a DOM fold
//! ([`extract_text`]), a normalizer ([`clean`]) and the page-level
//! extractor that removes noise, de-duplicates blocks and enforces a byte
//! budget ([`PageContentExtractor`]).

mod content;
mod dom_text;
mod normalize;
mod page_info;

pub use content::{ExtractorConfig, PageContentExtractor, extract_from_html, truncate_to_budget};
pub use dom_text::extract_text;
pub use normalize::clean;
pub use page_info::PageMeta;
