//! Link and image conversion.
//!
//! `[label](target)` and `![label](target)` both become
//! `<a href="target">label</a>`; the renderer has no image embeds, so the
//! `!` is dropped. The label may contain bracketed groups, as in
//! `[see [1]](https://example.com)`. Brackets that don't form a complete
//! `[...](...)` are left alone, as are targets that picked up a tag or a
//! code placeholder from an earlier pass: an attribute can't hold markup.
//!
//! A label is a run of non-bracket characters and nested groups, where a
//! group opened by `[` may close at any `]` on the same line (nearest
//! first). Where a label starting at a given position ends depends only on
//! the text after it, so the table is filled for every position in a single
//! right-to-left pass.

use std::borrow::Cow;

use memchr::memchr;

#[derive(Debug, Clone, Copy)]
struct LinkMatch {
    /// Index of the `]` closing the label.
    label_end: usize,
    target_start: usize,
    target_end: usize,
    /// Index just past the closing `)`.
    end: usize,
}

/// `(target)` directly after the label's closing bracket.
fn target_after(bytes: &[u8], label_end: usize) -> Option<LinkMatch> {
    let target_start = label_end + 2;
    if bytes.get(label_end + 1) != Some(&b'(') || target_start >= bytes.len() {
        return None;
    }
    let target_end = target_start + memchr(b')', &bytes[target_start..])?;
    if target_end == target_start {
        return None;
    }
    Some(LinkMatch {
        label_end,
        target_start,
        target_end,
        end: target_end + 1,
    })
}

/// For each position from `base` on, the closing `]` of a label starting
/// there, if the label is followed by a valid target.
struct LabelTable {
    base: usize,
    label_end: Vec<Option<usize>>,
}

impl LabelTable {
    fn new(bytes: &[u8], base: usize) -> Self {
        let len = bytes.len() - base;
        let mut label_end = vec![None; len + 1];
        // Nearest `]` at or after each position, on the same line, that
        // closes a nested group the rest of the label can continue from.
        let mut group_close: Vec<Option<usize>> = vec![None; len + 1];
        let mut next_paren: Option<usize> = None;

        for i in (0..len).rev() {
            let at = base + i;
            label_end[i] = match bytes[at] {
                // `](` followed by a non-empty target up to the nearest `)`.
                b']' if bytes.get(at + 1) == Some(&b'(')
                    && next_paren.is_some_and(|paren| paren > at + 2) =>
                {
                    Some(at)
                }
                b']' => None,
                b'[' => group_close[i + 1].and_then(|close| label_end[close - base + 1]),
                _ => label_end[i + 1],
            };
            group_close[i] = match bytes[at] {
                b'\n' => None,
                b']' if label_end[i + 1].is_some() => Some(at),
                _ => group_close[i + 1],
            };
            if bytes[at] == b')' {
                next_paren = Some(at);
            }
        }

        Self { base, label_end }
    }

    fn link_from(&self, bytes: &[u8], pos: usize) -> Option<LinkMatch> {
        let label_end = self.label_end[pos - self.base]?;
        target_after(bytes, label_end)
    }
}

fn is_plain_target(target: &str) -> bool {
    !target.contains(['<', '\u{E000}'])
}

/// Rewrite Markdown links and images as anchors.
///
/// ```rust
/// use telemark_core::link::convert_links;
///
/// assert_eq!(
///     convert_links("[text [nested] more](http://x)"),
///     "<a href=\"http://x\">text [nested] more</a>"
/// );
/// assert_eq!(convert_links("[not a link] here"), "[not a link] here");
/// ```
pub fn convert_links(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let Some(first) = memchr(b'[', bytes) else {
        return Cow::Borrowed(text);
    };

    let table = LabelTable::new(bytes, first);
    let mut out: Option<String> = None;
    let mut last = 0;
    let mut pos = first;

    while let Some(offset) = memchr(b'[', &bytes[pos..]) {
        let open = pos + offset;

        let link = table
            .link_from(bytes, open + 1)
            .filter(|link| is_plain_target(&text[link.target_start..link.target_end]));
        match link {
            Some(link) => {
                let start = if open > last && bytes[open - 1] == b'!' {
                    open - 1
                } else {
                    open
                };
                let out = out.get_or_insert_with(|| String::with_capacity(text.len() + 32));
                out.push_str(&text[last..start]);
                out.push_str("<a href=\"");
                out.push_str(&text[link.target_start..link.target_end]);
                out.push_str("\">");
                out.push_str(&text[open + 1..link.label_end]);
                out.push_str("</a>");
                last = link.end;
                pos = link.end;
            }
            None => pos = open + 1,
        }
    }

    match out {
        Some(mut out) => {
            out.push_str(&text[last..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}
