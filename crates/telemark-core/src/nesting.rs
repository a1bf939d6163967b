//! Tag nesting repair.
//!
//! Passes that work on different units (quote lines, marker pairs, link
//! brackets) can emit tags that cross, as in
//! `<b>a<blockquote>b</b></blockquote>`. The renderer rejects crossed tags,
//! so the finished HTML is walked with a tag stack. A close tag that is not
//! the innermost one closes the tags above it first, and those are reopened
//! before the next content.
//!
//! Every `<` in converter output starts a tag: text and code content are
//! entity-escaped before any tag is emitted.

use std::borrow::Cow;

use memchr::memchr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Open { name: &'a str, tag: &'a str },
    Close { name: &'a str, tag: &'a str },
}

struct Tokens<'a> {
    html: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(html: &'a str) -> Self {
        Self { html, pos: 0 }
    }
}

fn tag_name(tag: &str) -> &str {
    let inner = tag.trim_start_matches('<').trim_start_matches('/');
    let end = inner
        .find(|c: char| c == ' ' || c == '>')
        .unwrap_or(inner.len());
    &inner[..end]
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.html.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        let start = self.pos;
        let lt = match memchr(b'<', &bytes[start..]) {
            Some(0) => start,
            Some(offset) => {
                self.pos = start + offset;
                return Some(Token::Text(&self.html[start..start + offset]));
            }
            None => {
                self.pos = bytes.len();
                return Some(Token::Text(&self.html[start..]));
            }
        };

        let Some(offset) = memchr(b'>', &bytes[lt..]) else {
            self.pos = bytes.len();
            return Some(Token::Text(&self.html[lt..]));
        };
        self.pos = lt + offset + 1;
        let tag = &self.html[lt..self.pos];
        let name = tag_name(tag);

        Some(if bytes.get(lt + 1) == Some(&b'/') {
            Token::Close { name, tag }
        } else {
            Token::Open { name, tag }
        })
    }
}

/// Whether every close tag matches the innermost open tag and none are left
/// open.
pub fn is_well_nested(html: &str) -> bool {
    let mut stack = Vec::new();
    for token in Tokens::new(html) {
        match token {
            Token::Text(_) => {}
            Token::Open { name, .. } => stack.push(name),
            Token::Close { name, .. } => {
                if stack.pop() != Some(name) {
                    return false;
                }
            }
        }
    }
    stack.is_empty()
}

fn push_close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Rewrite crossed tags into properly nested ones.
///
/// Well-nested input is returned borrowed. Close tags without a matching
/// open tag are dropped and tags still open at the end are closed.
///
/// ```rust
/// use telemark_core::nesting::nest_tags;
///
/// assert_eq!(
///     nest_tags("<b>a<blockquote>b</b></blockquote>"),
///     "<b>a<blockquote>b</blockquote></b>"
/// );
/// assert_eq!(nest_tags("<b>a</b>"), "<b>a</b>");
/// ```
pub fn nest_tags(html: &str) -> Cow<'_, str> {
    if is_well_nested(html) {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 64);
    // (name, open tag) as emitted
    let mut open: Vec<(&str, &str)> = Vec::new();
    // Closed early because an outer tag closed; still logically open.
    let mut pending: Vec<(&str, &str)> = Vec::new();

    for token in Tokens::new(html) {
        match token {
            Token::Text(text) => {
                reopen(&mut out, &mut open, &mut pending);
                out.push_str(text);
            }
            Token::Open { name, tag } => {
                reopen(&mut out, &mut open, &mut pending);
                out.push_str(tag);
                open.push((name, tag));
            }
            Token::Close { name, tag } => {
                if let Some(at) = pending.iter().rposition(|(n, _)| *n == name) {
                    pending.remove(at);
                } else if let Some(at) = open.iter().rposition(|(n, _)| *n == name) {
                    let mut crossed = open.split_off(at + 1);
                    for (inner, _) in crossed.iter().rev() {
                        push_close(&mut out, inner);
                    }
                    out.push_str(tag);
                    open.pop();
                    crossed.append(&mut pending);
                    pending = crossed;
                }
            }
        }
    }
    for (name, _) in open.iter().rev() {
        push_close(&mut out, name);
    }

    Cow::Owned(out)
}

fn reopen<'a>(
    out: &mut String,
    open: &mut Vec<(&'a str, &'a str)>,
    pending: &mut Vec<(&'a str, &'a str)>,
) {
    for (name, tag) in pending.drain(..) {
        out.push_str(tag);
        open.push((name, tag));
    }
}
