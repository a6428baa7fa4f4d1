//! Request validation; runs before any network I/O

use super::types::{SearchConfig, SearchError, SearchFormat, SearchRequest, ValidatedSearch};
use crate::utils::constants::{MAX_QUERY_LENGTH, MAX_URL_LENGTH};
use crate::utils::url::{parse_http_url, percent_decode_lenient};

const PLACEHOLDER: &str = "%s";

pub fn validate(request: &SearchRequest, config: &SearchConfig) -> Result<ValidatedSearch, SearchError> {
    // Length is bounded on the decoded query before trimming
    let decoded = percent_decode_lenient(&request.query);
    if decoded.chars().count() > MAX_QUERY_LENGTH {
        return Err(invalid(format!(
            "Query exceeds {MAX_QUERY_LENGTH} characters"
        )));
    }
    let query = decoded.trim();
    if query.is_empty() {
        return Err(invalid("Query must not be empty"));
    }

    let template = request.url_template.trim();
    if template.chars().count() > MAX_URL_LENGTH {
        return Err(invalid(format!(
            "Search URL exceeds {MAX_URL_LENGTH} characters"
        )));
    }
    if template.matches(PLACEHOLDER).count() != 1 {
        return Err(invalid("Search URL must contain exactly one %s placeholder"));
    }
    let base_url = parse_http_url(&template.replace(PLACEHOLDER, ""))
        .ok_or_else(|| invalid("Search URL must be a valid http(s) URL"))?;

    let format: SearchFormat = request.format.parse()?;

    Ok(ValidatedSearch {
        query: query.to_string(),
        url_template: template.to_string(),
        format,
        limit: clamp_limit(request.limit, config),
        follow_links: request.follow_links,
        base_url,
    })
}

/// Missing limit uses the default; anything else lands in `[1, max_limit]`
fn clamp_limit(limit: Option<i64>, config: &SearchConfig) -> usize {
    let max = config.max_limit.max(1);
    match limit {
        None => config.default_limit.clamp(1, max),
        Some(n) => {
            let max_i64 = i64::try_from(max).unwrap_or(i64::MAX);
            // clamped into [1, max], which always fits usize
            usize::try_from(n.clamp(1, max_i64)).unwrap_or(max)
        }
    }
}

fn invalid(message: impl Into<String>) -> SearchError {
    SearchError::Validation(message.into())
}
