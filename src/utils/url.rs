//! URL decoding and shape checks shared by the link fetcher and search aggregator

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::constants::MAX_URL_LENGTH;

/// `http(s)://host...` with no whitespace anywhere
static HTTP_URL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#]+.[^\s]*$").expect("Invalid URL shape regex")
});

/// A `%` not followed by two hex digits
static MALFORMED_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:[^0-9A-Fa-f]|[0-9A-Fa-f][^0-9A-Fa-f]|[0-9A-Fa-f]?$)")
        .expect("Invalid malformed escape regex")
});

/// Percent-decode `input`
///
/// Returns `None` for malformed escapes (`%zz`, a trailing `%`) and when the
/// decoded bytes are not UTF-8.
pub fn percent_decode(input: &str) -> Option<String> {
    if MALFORMED_ESCAPE.is_match(input) {
        return None;
    }
    urlencoding::decode(input).ok().map(|decoded| decoded.into_owned())
}

/// Percent-decode `input`, falling back to the original string on failure
pub fn percent_decode_lenient(input: &str) -> String {
    percent_decode(input).unwrap_or_else(|| {
        tracing::warn!("Failed to decode URL, using it as-is: {}", input);
        input.to_string()
    })
}

/// Whether `candidate` has the `http(s)://host/path` shape
pub fn has_http_shape(candidate: &str) -> bool {
    HTTP_URL_SHAPE.is_match(candidate)
}

/// Parse `candidate` and accept it only for the `http` and `https` schemes
pub fn parse_http_url(candidate: &str) -> Option<Url> {
    let parsed = Url::parse(candidate).ok()?;
    matches!(parsed.scheme(), "http" | "https").then_some(parsed)
}

/// Decide whether a raw link-batch entry is fetchable
///
/// Drops empty, `"undefined"`, whitespace-only, undecodable, over-long and
/// non-`http(s)` entries. Returns the trimmed original on success.
pub fn accept_candidate_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "undefined" {
        return None;
    }

    let decoded = percent_decode(trimmed)?;
    if decoded.chars().count() > MAX_URL_LENGTH {
        return None;
    }

    (parse_http_url(&decoded).is_some() && has_http_shape(&decoded)).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_https_url() {
        assert_eq!(
            accept_candidate_url("  https://example.com/page?a=1 "),
            Some("https://example.com/page?a=1".to_string())
        );
    }

    #[test]
    fn accepts_percent_encoded_url() {
        let raw = "https%3A%2F%2Fexample.com%2Fdocs";
        assert_eq!(accept_candidate_url(raw), Some(raw.to_string()));
    }

    #[test]
    fn rejects_placeholder_and_blank_entries() {
        assert_eq!(accept_candidate_url(""), None);
        assert_eq!(accept_candidate_url("   "), None);
        assert_eq!(accept_candidate_url("undefined"), None);
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert_eq!(accept_candidate_url("ftp://example.com/file"), None);
        assert_eq!(accept_candidate_url("javascript:alert(1)"), None);
        assert_eq!(accept_candidate_url("example.com"), None);
    }

    #[test]
    fn rejects_invalid_utf8_after_decoding() {
        assert_eq!(accept_candidate_url("https://example.com/%FF%FE"), None);
    }

    #[test]
    fn rejects_malformed_escapes() {
        assert_eq!(accept_candidate_url("https://a.example/100%zz"), None);
        assert_eq!(accept_candidate_url("https://a.example/x%4"), None);
        assert_eq!(accept_candidate_url("https://a.example/100%"), None);
        assert_eq!(accept_candidate_url("https://a.example/%%41"), None);
    }

    #[test]
    fn well_formed_escapes_still_decode() {
        assert_eq!(percent_decode("a%2Fb%3a"), Some("a/b:".to_string()));
        assert_eq!(percent_decode("no escapes"), Some("no escapes".to_string()));
        assert_eq!(percent_decode("100%zz"), None);
    }

    #[test]
    fn rejects_overlong_url() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert_eq!(accept_candidate_url(&long), None);
    }

    #[test]
    fn rejects_whitespace_inside_decoded_url() {
        assert_eq!(accept_candidate_url("https://example.com/a%20b"), None);
    }

    #[test]
    fn lenient_decode_keeps_original_on_failure() {
        assert_eq!(percent_decode_lenient("a%FFb"), "a%FFb");
        assert_eq!(percent_decode_lenient("a%20b"), "a b");
    }
}
