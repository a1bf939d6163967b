//! Final tidying of converted text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Retrieval citations such as `【4:0†source】` left by assistant APIs.
static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【[^】]+】").expect("CITATION: hardcoded regex is valid"));

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("BLANK_RUN: hardcoded regex is valid"));

/// Remove `【...】` citation markers.
pub fn strip_citations(text: &str) -> Cow<'_, str> {
    CITATION.replace_all(text, "")
}

/// Collapse three or more consecutive newlines to two.
pub fn collapse_blank_lines(text: &str) -> Cow<'_, str> {
    BLANK_RUN.replace_all(text, "\n\n")
}

/// Collapse blank-line runs and trim surrounding whitespace.
///
/// ```rust
/// use telemark_core::cleanup::finish;
///
/// assert_eq!(finish("\n\n a\n\n\n\nb \n"), "a\n\nb");
/// ```
pub fn finish(text: &str) -> String {
    collapse_blank_lines(text).trim().to_string()
}
