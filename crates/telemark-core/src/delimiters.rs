//! Closing of unterminated code delimiters.
//!
//! LLM output is frequently cut off mid-answer, leaving a code fence or an
//! inline code span open. Before extraction we count delimiters and append
//! the missing closer, so the tail renders as code instead of leaking
//! backticks into the styled text.
//!
//! This works on raw counts, not parse state. An intentionally unbalanced
//! literal backtick gets "repaired" too.

use std::borrow::Cow;

use memchr::{memchr_iter, memmem};

use crate::span::Span;

/// Fenced code delimiter.
pub const FENCE: &str = "```";

/// Inline code delimiter.
pub const BACKTICK: &str = "`";

/// A delimiter appended by [`repair_delimiters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repair {
    /// The delimiter text that was appended.
    pub delimiter: &'static str,
    /// Where it landed in the repaired text.
    pub span: Span,
}

/// Repaired text plus the list of appended delimiters, in append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired<'a> {
    pub text: Cow<'a, str>,
    pub repairs: Vec<Repair>,
}

impl Repaired<'_> {
    /// True when the input needed no repair.
    pub fn is_untouched(&self) -> bool {
        self.repairs.is_empty()
    }
}

/// Balance fence and backtick counts by appending closers.
///
/// The number of non-overlapping ```` ``` ```` sequences is made even first;
/// then, if the total number of backticks is odd, a single `` ` `` is
/// appended.
pub fn repair_delimiters(text: &str) -> Repaired<'_> {
    let bytes = text.as_bytes();
    let fences = memmem::find_iter(bytes, FENCE.as_bytes()).count();
    let mut backticks = memchr_iter(b'`', bytes).count();

    let mut repairs = Vec::new();
    let mut len = text.len();

    if fences % 2 != 0 {
        repairs.push(Repair {
            delimiter: FENCE,
            span: Span::from_range(len..len + FENCE.len()),
        });
        len += FENCE.len();
        backticks += FENCE.len();
    }
    if backticks % 2 != 0 {
        repairs.push(Repair {
            delimiter: BACKTICK,
            span: Span::from_range(len..len + BACKTICK.len()),
        });
    }

    if repairs.is_empty() {
        return Repaired {
            text: Cow::Borrowed(text),
            repairs,
        };
    }

    let mut repaired = String::with_capacity(text.len() + FENCE.len() + BACKTICK.len());
    repaired.push_str(text);
    for repair in &repairs {
        repaired.push_str(repair.delimiter);
    }
    Repaired {
        text: Cow::Owned(repaired),
        repairs,
    }
}

/// [`repair_delimiters`] without the repair report.
///
/// ```rust
/// use telemark_core::delimiters::ensure_closing_delimiters;
///
/// assert_eq!(ensure_closing_delimiters("a `b"), "a `b`");
/// assert_eq!(ensure_closing_delimiters("```rust\nfn x()"), "```rust\nfn x()```");
/// ```
pub fn ensure_closing_delimiters(text: &str) -> Cow<'_, str> {
    repair_delimiters(text).text
}
