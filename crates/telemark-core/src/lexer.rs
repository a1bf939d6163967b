//! Lossless line splitting.
//!
//! Line-oriented passes need to rewrite some lines and copy the rest through
//! byte for byte, so every [`Line`] keeps the terminator it was split on.
//! Concatenating `text + ending` over all lines reproduces the input exactly.

use crate::span::Span;
use memchr::memchr;

/// A single line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text, without its terminator.
    pub text: &'a str,
    /// `"\n"`, `"\r\n"`, or `""` for a final unterminated line.
    pub ending: &'a str,
    /// Byte span of `text` in the input.
    pub span: Span,
}

impl<'a> Line<'a> {
    #[inline(always)]
    pub fn strip_prefix(&self, prefix: &str) -> Option<&'a str> {
        self.text.strip_prefix(prefix)
    }
}

/// Iterator over the lines of a text, using `memchr` to find newlines.
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Lexer<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        let bytes = self.input.as_bytes();
        if self.offset >= bytes.len() {
            return None;
        }

        let start = self.offset;
        let (text_end, next) = match memchr(b'\n', &bytes[start..]) {
            Some(pos) => {
                let newline = start + pos;
                if newline > start && bytes[newline - 1] == b'\r' {
                    (newline - 1, newline + 1)
                } else {
                    (newline, newline + 1)
                }
            }
            None => (bytes.len(), bytes.len()),
        };
        self.offset = next;

        Some(Line {
            text: &self.input[start..text_end],
            ending: &self.input[text_end..next],
            span: Span::from_range(start..text_end),
        })
    }
}
