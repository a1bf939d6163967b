//! Line-level structure: headings and unordered list items.
//!
//! The target renderer has no heading or list elements. Every heading level
//! becomes bold text and every `-`/`*` bullet becomes a `•` glyph, keeping
//! the item's indentation.
//!
//! Both passes run on escaped text before quotes are combined, so a quoted
//! line still starts with its `&gt;` or `**&gt;` marker. The marker is kept
//! and the line after it is converted, which leaves the emitted tags inside
//! the quote.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Glyph that replaces `-` and `*` list markers.
pub const BULLET: &str = "•";

/// Optional escaped quote marker, captured so it survives the rewrite.
const QUOTE_PREFIX: &str = r"((?:\*\*)?&gt; ?)?";

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^{QUOTE_PREFIX}#{{1,6}}\s+(.+)$"))
        .expect("HEADING: hardcoded regex is valid")
});

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^{QUOTE_PREFIX}(\s*)[-*]\s+(.+)$"))
        .expect("LIST_ITEM: hardcoded regex is valid")
});

/// `# Title` through `###### Title` → `<b>Title</b>`.
///
/// ```rust
/// use telemark_core::structure::convert_headings;
///
/// assert_eq!(convert_headings("## Setup\ntext"), "<b>Setup</b>\ntext");
/// assert_eq!(convert_headings("&gt; # Note"), "&gt; <b>Note</b>");
/// ```
pub fn convert_headings(text: &str) -> Cow<'_, str> {
    HEADING.replace_all(text, "${1}<b>$2</b>")
}

/// `- item` / `* item` → `• item`, leading whitespace preserved.
///
/// Runs before single-`*` italics, so a line starting with `* ` is always a
/// bullet and never an italic opener.
pub fn convert_lists(text: &str) -> Cow<'_, str> {
    LIST_ITEM.replace_all(text, format!("${{1}}${{2}}{} $3", BULLET).as_str())
}
