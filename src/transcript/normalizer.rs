//! Caption text cleanup.

use regex::Regex;
use std::sync::LazyLock;

/// Matches a token carrying a bracketed caption annotation such as
/// `[Music]` or `[Applause]`.
static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*\]").expect("annotation pattern is valid"));

/// Strip bracketed annotations from raw transcript text.
///
/// The text is split on whitespace, every token containing a `[...]`
/// annotation is dropped, and the remaining tokens are joined with single
/// spaces. The result is stable under repeated application.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .filter(|token| !ANNOTATION.is_match(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true when a transcript carries no usable text after cleanup.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
