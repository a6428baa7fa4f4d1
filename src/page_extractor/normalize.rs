//! Whitespace and punctuation cleanup for extracted text

use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F\u{200B}-\u{200D}\u{2060}\u{FEFF}]")
        .expect("Invalid unsafe character regex")
});

static HORIZONTAL_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\S\r\n]+").expect("Invalid horizontal whitespace regex"));

static LINE_ENDINGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n?").expect("Invalid line ending regex"));

static NEWLINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" *\n[ \n]*").expect("Invalid newline run regex"));

/// Normalize extracted text
///
/// In order: drop control and zero-width characters, collapse horizontal
/// whitespace, unify line endings, collapse blank lines, space out commas
/// and digits glued to the following word, trim.
pub fn clean(text: &str) -> String {
    let text = UNSAFE_CHARS.replace_all(text, "");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = LINE_ENDINGS.replace_all(&text, "\n");
    let text = NEWLINE_RUNS.replace_all(&text, "\n");
    unglue(&text).trim().to_string()
}

/// Insert a space after `,` and after a digit when the next char is neither
/// whitespace nor (for digits) another digit
fn unglue(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        let Some(&next) = chars.peek() else { break };
        if next.is_whitespace() {
            continue;
        }
        let glued = match c {
            ',' => true,
            d if d.is_ascii_digit() => !next.is_ascii_digit(),
            _ => false,
        };
        if glued {
            out.push(' ');
        }
    }

    out
}
