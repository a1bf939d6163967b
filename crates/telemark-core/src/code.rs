//! Code extraction and placeholder reinsertion.
//!
//! Fenced blocks and inline code spans are rendered to HTML up front and
//! swapped out for placeholder tokens, so none of the later passes (escaping,
//! quotes, headings, lists, styles, links) can see their content. After those
//! passes have run, [`Extracted::reinsert`] puts the rendered HTML back.
//!
//! Tokens look like `\u{E000}CODEBLOCK3\u{E001}`. The two private-use
//! sentinels are reserved: [`strip_reserved`] removes them from the source
//! text before extraction, so a token can never collide with input text, and
//! the closing sentinel keeps `…1` from matching the start of `…10`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use memchr::memmem;
use regex::Regex;

use crate::escape::escape_html;
use crate::span::Span;

const TOKEN_OPEN: char = '\u{E000}';
const TOKEN_CLOSE: char = '\u{E001}';

/// ```` ```lang\n...``` ````, nearest closing fence wins.
static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(\w*)\n?(.*?)```").expect("FENCED_CODE: hardcoded regex is valid")
});

/// `` `...` `` on a single line.
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`\n]*)`").expect("INLINE_CODE: hardcoded regex is valid")
});

/// Remove the placeholder sentinels from untrusted input.
pub fn strip_reserved(text: &str) -> Cow<'_, str> {
    if text.contains([TOKEN_OPEN, TOKEN_CLOSE]) {
        Cow::Owned(text.replace([TOKEN_OPEN, TOKEN_CLOSE], ""))
    } else {
        Cow::Borrowed(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    /// Triple-backtick block, rendered as `<pre><code>`.
    Fenced,
    /// Single-backtick span, rendered as `<code>`.
    Inline,
}

/// One piece of code found in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeFragment<'a> {
    pub kind: CodeKind,
    /// Language tag from the opening fence. Always `None` for inline code.
    pub language: Option<&'a str>,
    /// Raw, unescaped content between the delimiters.
    pub content: &'a str,
    /// Span of the whole fragment, delimiters included.
    pub span: Span,
}

impl CodeFragment<'_> {
    /// Render the fragment with its content entity-escaped.
    pub fn to_html(&self) -> String {
        let content = escape_html(self.content);
        match (self.kind, self.language) {
            (CodeKind::Fenced, Some(language)) => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                language, content
            ),
            (CodeKind::Fenced, None) => format!("<pre><code>{}</code></pre>", content),
            (CodeKind::Inline, _) => format!("<code>{}</code>", content),
        }
    }
}

/// A placeholder token and the HTML it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub token: String,
    pub html: String,
}

/// Text with code swapped out, plus the placeholder table in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub placeholders: Vec<Placeholder>,
    fenced: usize,
    inline: usize,
}

impl Extracted {
    /// Number of fenced blocks extracted.
    pub fn fenced_count(&self) -> usize {
        self.fenced
    }

    /// Number of inline code spans extracted.
    pub fn inline_count(&self) -> usize {
        self.inline
    }

    fn push(&mut self, fragment: &CodeFragment<'_>) {
        let token = match fragment.kind {
            CodeKind::Fenced => {
                self.fenced += 1;
                format!("{TOKEN_OPEN}CODEBLOCK{}{TOKEN_CLOSE}", self.fenced - 1)
            }
            CodeKind::Inline => {
                self.inline += 1;
                format!("{TOKEN_OPEN}INLINECODE{}{TOKEN_CLOSE}", self.inline - 1)
            }
        };
        self.text.push_str(&token);
        self.placeholders.push(Placeholder {
            token,
            html: fragment.to_html(),
        });
    }

    /// Substitute every placeholder in `text` with its rendered HTML.
    ///
    /// Each token is replaced at its first occurrence and at most once;
    /// substituted HTML is never rescanned. Tokens that a later pass removed
    /// are simply skipped.
    pub fn reinsert(&self, text: &str) -> String {
        if self.placeholders.is_empty() {
            return text.to_string();
        }

        let index: HashMap<&str, usize> = self
            .placeholders
            .iter()
            .enumerate()
            .map(|(i, p)| (p.token.as_str(), i))
            .collect();
        let mut used = vec![false; self.placeholders.len()];

        let mut open_buf = [0u8; 4];
        let open = TOKEN_OPEN.encode_utf8(&mut open_buf).as_bytes();
        let mut close_buf = [0u8; 4];
        let close = TOKEN_CLOSE.encode_utf8(&mut close_buf).as_bytes();

        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len() + 64 * self.placeholders.len());
        let mut last = 0;
        let mut pos = 0;

        while let Some(offset) = memmem::find(&bytes[pos..], open) {
            let start = pos + offset;
            let Some(close_offset) = memmem::find(&bytes[start + open.len()..], close) else {
                break;
            };
            let end = start + open.len() + close_offset + close.len();

            match index.get(&text[start..end]) {
                Some(&i) if !used[i] => {
                    used[i] = true;
                    out.push_str(&text[last..start]);
                    out.push_str(&self.placeholders[i].html);
                    last = end;
                    pos = end;
                }
                _ => pos = start + open.len(),
            }
        }
        out.push_str(&text[last..]);
        out
    }
}

/// Find the fenced blocks and inline code spans of `text`, in source order.
///
/// Fences are located first. Inline spans are only searched for in the text
/// between fences, so a backtick scan never matches a fence delimiter.
pub fn code_fragments(text: &str) -> Vec<CodeFragment<'_>> {
    let mut fragments = Vec::new();
    let mut gap_start = 0;

    for caps in FENCED_CODE.captures_iter(text) {
        let (Some(whole), Some(content)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        push_inline(text, gap_start..whole.start(), &mut fragments);

        let language = caps.get(1).map(|m| m.as_str()).filter(|l| !l.is_empty());
        fragments.push(CodeFragment {
            kind: CodeKind::Fenced,
            language,
            content: content.as_str(),
            span: Span::from_range(whole.range()),
        });
        gap_start = whole.end();
    }
    push_inline(text, gap_start..text.len(), &mut fragments);

    fragments
}

fn push_inline<'a>(
    text: &'a str,
    gap: std::ops::Range<usize>,
    fragments: &mut Vec<CodeFragment<'a>>,
) {
    let gap_text = &text[gap.clone()];
    for caps in INLINE_CODE.captures_iter(gap_text) {
        let (Some(whole), Some(content)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        fragments.push(CodeFragment {
            kind: CodeKind::Inline,
            language: None,
            content: content.as_str(),
            span: Span::from_range(gap.start + whole.start()..gap.start + whole.end()),
        });
    }
}

/// Replace all code in `text` with placeholders.
///
/// `text` should already have had its delimiters repaired and its reserved
/// sentinels stripped.
///
/// ```rust
/// use telemark_core::code::extract_code;
///
/// let extracted = extract_code("run `ls` first");
/// assert_eq!(extracted.inline_count(), 1);
/// assert!(!extracted.text.contains('`'));
/// assert_eq!(extracted.reinsert(&extracted.text), "run <code>ls</code> first");
/// ```
pub fn extract_code(text: &str) -> Extracted {
    let mut extracted = Extracted {
        text: String::with_capacity(text.len()),
        ..Extracted::default()
    };
    let mut last = 0;

    for fragment in code_fragments(text) {
        let range = fragment.span.range();
        extracted.text.push_str(&text[last..range.start]);
        extracted.push(&fragment);
        last = range.end;
    }
    extracted.text.push_str(&text[last..]);

    extracted
}
