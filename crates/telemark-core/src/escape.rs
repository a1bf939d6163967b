//! HTML entity escaping.
//!
//! The renderer only understands `&amp;`, `&lt;` and `&gt;`, so those are the
//! only three characters rewritten. Quotes are left alone.

use std::borrow::Cow;

use memchr::memchr3;

/// Escape `&`, `<` and `>` to their character references.
///
/// Each source character is rewritten exactly once, so the `&` introduced by
/// `&lt;` is never escaped again. Returns the input unchanged (borrowed) when
/// there is nothing to escape.
///
/// ```rust
/// use telemark_core::escape::escape_html;
///
/// assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
/// assert_eq!(escape_html("&"), "&amp;");
/// ```
pub fn escape_html(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let Some(first) = memchr3(b'&', b'<', b'>', bytes) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first]);

    let mut pos = first;
    while let Some(offset) = memchr3(b'&', b'<', b'>', &bytes[pos..]) {
        let at = pos + offset;
        out.push_str(&text[pos..at]);
        out.push_str(match bytes[at] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            _ => "&gt;",
        });
        pos = at + 1;
    }
    out.push_str(&text[pos..]);

    Cow::Owned(out)
}
