//! Blockquote combining.
//!
//! Consecutive quoted lines become one `<blockquote>` element with their line
//! breaks kept inside it. A line starting with `**>` opens an expandable
//! quote; `>` lines that follow it continue that quote, the same way they
//! continue a regular one. A `**>` line always starts a fresh block, even
//! directly after another quote.

use std::borrow::Cow;

use memchr::memchr;

use crate::lexer::{Lexer, Line};

/// How the `>` marker appears in the text being combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMarker {
    /// Plain Markdown, `>`.
    Raw,
    /// Entity-escaped text, `&gt;`. This is what the converter pipeline sees.
    Escaped,
}

impl QuoteMarker {
    fn quote(self) -> &'static str {
        match self {
            QuoteMarker::Raw => ">",
            QuoteMarker::Escaped => "&gt;",
        }
    }

    fn expandable(self) -> &'static str {
        match self {
            QuoteMarker::Raw => "**>",
            QuoteMarker::Escaped => "**&gt;",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteKind {
    Regular,
    Expandable,
}

impl QuoteKind {
    fn open_tag(self) -> &'static str {
        match self {
            QuoteKind::Regular => "<blockquote>",
            QuoteKind::Expandable => "<blockquote expandable>",
        }
    }
}

enum LineClass<'a> {
    Start(QuoteKind, &'a str),
    Continue(&'a str),
    Plain,
}

fn classify<'a>(line: &Line<'a>, marker: QuoteMarker) -> LineClass<'a> {
    if let Some(rest) = line.strip_prefix(marker.expandable()) {
        LineClass::Start(QuoteKind::Expandable, strip_one_space(rest))
    } else if let Some(rest) = line.strip_prefix(marker.quote()) {
        LineClass::Continue(strip_one_space(rest))
    } else {
        LineClass::Plain
    }
}

#[inline]
fn strip_one_space(text: &str) -> &str {
    text.strip_prefix(' ').unwrap_or(text)
}

/// An open quote: its kind, body so far, and the terminator of its last line.
struct OpenQuote<'a> {
    kind: QuoteKind,
    body: String,
    ending: &'a str,
}

impl<'a> OpenQuote<'a> {
    fn new(kind: QuoteKind, first: &str, ending: &'a str) -> Self {
        Self {
            kind,
            body: first.to_string(),
            ending,
        }
    }

    fn extend(&mut self, line: &str, ending: &'a str) {
        self.body.push_str(self.ending);
        self.body.push_str(line);
        self.ending = ending;
    }

    fn close_into(self, out: &mut String) {
        out.push_str(self.kind.open_tag());
        out.push_str(&self.body);
        out.push_str("</blockquote>");
        out.push_str(self.ending);
    }
}

/// Merge runs of quoted lines into blockquote elements.
///
/// The marker and at most one following space are stripped from every quoted
/// line. Unquoted lines are copied through unchanged.
///
/// ```rust
/// use telemark_core::blockquote::{combine_blockquotes, QuoteMarker};
///
/// let out = combine_blockquotes("> line one\n> line two", QuoteMarker::Raw);
/// assert_eq!(out, "<blockquote>line one\nline two</blockquote>");
/// ```
pub fn combine_blockquotes(text: &str, marker: QuoteMarker) -> Cow<'_, str> {
    let first = marker.quote().as_bytes()[0];
    if memchr(first, text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 64);
    let mut open: Option<OpenQuote<'_>> = None;

    for line in Lexer::new(text) {
        match classify(&line, marker) {
            LineClass::Start(kind, rest) => {
                if let Some(quote) = open.take() {
                    quote.close_into(&mut out);
                }
                open = Some(OpenQuote::new(kind, rest, line.ending));
            }
            LineClass::Continue(rest) => {
                if let Some(quote) = open.as_mut() {
                    quote.extend(rest, line.ending);
                } else {
                    open = Some(OpenQuote::new(QuoteKind::Regular, rest, line.ending));
                }
            }
            LineClass::Plain => {
                if let Some(quote) = open.take() {
                    quote.close_into(&mut out);
                }
                out.push_str(line.text);
                out.push_str(line.ending);
            }
        }
    }
    if let Some(quote) = open.take() {
        quote.close_into(&mut out);
    }

    Cow::Owned(out)
}
