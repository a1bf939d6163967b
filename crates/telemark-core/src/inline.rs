//! Inline style conversion.
//!
//! Each style is a marker pair rewritten to a tag pair by a left-to-right
//! scan. Styles run one after another over the whole buffer, longest markers
//! first, so `***` is never read as `**` + `*` and `**` never as two
//! italics.
//!
//! Matching follows backtracking-regex semantics: the leftmost opener that
//! satisfies its flanking rule wins, and it closes at the nearest closer that
//! satisfies its own rule (overlapping closer positions are tried too).

use std::borrow::Cow;

use memchr::{memchr, memmem};

/// The inline styles, in the order [`convert_inline_styles`] applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `***x***` → `<b><i>x</i></b>`
    BoldItalic,
    /// `___x___` → `<u><i>x</i></u>`
    UnderlineItalic,
    /// `**x**` → `<b>x</b>`
    Bold,
    /// `__x__` → `<u>x</u>`
    Underline,
    /// `~~x~~` → `<s>x</s>`
    Strikethrough,
    /// `||x||` → `<span class="tg-spoiler">x</span>`
    Spoiler,
    /// `*x*` → `<i>x</i>`, guarded against arithmetic like `2 * 3` or `a*b`
    Italic,
    /// `_x_` → `<i>x</i>`
    ItalicUnderscore,
}

impl Style {
    pub const ALL: [Style; 8] = [
        Style::BoldItalic,
        Style::UnderlineItalic,
        Style::Bold,
        Style::Underline,
        Style::Strikethrough,
        Style::Spoiler,
        Style::Italic,
        Style::ItalicUnderscore,
    ];

    /// The Markdown marker used on both sides.
    pub fn marker(self) -> &'static str {
        self.rule().marker
    }

    fn rule(self) -> Rule {
        match self {
            Style::BoldItalic => Rule::new("***", "<b><i>", "</i></b>", Flank::Free, false),
            Style::UnderlineItalic => Rule::new("___", "<u><i>", "</i></u>", Flank::Free, false),
            Style::Bold => Rule::new("**", "<b>", "</b>", Flank::Word, true),
            Style::Underline => Rule::new("__", "<u>", "</u>", Flank::Word, true),
            Style::Strikethrough => Rule::new("~~", "<s>", "</s>", Flank::Word, true),
            Style::Spoiler => Rule::new(
                "||",
                "<span class=\"tg-spoiler\">",
                "</span>",
                Flank::Word,
                true,
            ),
            Style::Italic => Rule::new("*", "<i>", "</i>", Flank::Arithmetic, true),
            Style::ItalicUnderscore => Rule::new("_", "<i>", "</i>", Flank::Word, true),
        }
    }
}

/// What may sit next to a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flank {
    /// No restriction.
    Free,
    /// No word character before the opener or after the closer.
    Word,
    /// No ASCII alphanumeric before the opener or after the closer, and no
    /// whitespace just inside either marker.
    Arithmetic,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    marker: &'static str,
    open_tag: &'static str,
    close_tag: &'static str,
    flank: Flank,
    /// Whether the content may span lines.
    multiline: bool,
}

/// Unicode `\w`: alphanumerics and underscore.
#[inline(always)]
fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[inline(always)]
fn char_before(text: &str, at: usize) -> Option<char> {
    text[..at].chars().next_back()
}

#[inline(always)]
fn char_at(text: &str, at: usize) -> Option<char> {
    text[at..].chars().next()
}

impl Rule {
    const fn new(
        marker: &'static str,
        open_tag: &'static str,
        close_tag: &'static str,
        flank: Flank,
        multiline: bool,
    ) -> Self {
        Self {
            marker,
            open_tag,
            close_tag,
            flank,
            multiline,
        }
    }

    fn opens_at(&self, text: &str, start: usize) -> bool {
        let before = char_before(text, start);
        match self.flank {
            Flank::Free => true,
            Flank::Word => !before.is_some_and(is_word),
            Flank::Arithmetic => {
                !before.is_some_and(|c| c.is_ascii_alphanumeric())
                    && char_at(text, start + self.marker.len()).is_some_and(|c| !c.is_whitespace())
            }
        }
    }

    fn closes_at(&self, text: &str, at: usize) -> bool {
        let after = char_at(text, at + self.marker.len());
        match self.flank {
            Flank::Free => true,
            Flank::Word => !after.is_some_and(is_word),
            Flank::Arithmetic => {
                !char_before(text, at).is_some_and(char::is_whitespace)
                    && !after.is_some_and(|c| c.is_ascii_alphanumeric())
            }
        }
    }

    /// End of the region a closer for content starting at `content_start`
    /// has to lie in.
    fn search_end(&self, bytes: &[u8], content_start: usize) -> usize {
        if self.multiline {
            bytes.len()
        } else {
            memchr(b'\n', &bytes[content_start..]).map_or(bytes.len(), |p| content_start + p)
        }
    }

    /// Nearest acceptable closer in `content_start..end`.
    fn find_close(
        &self,
        text: &str,
        finder: &memmem::Finder<'_>,
        content_start: usize,
        end: usize,
    ) -> Option<usize> {
        let bytes = text.as_bytes();
        let mut from = content_start;
        while let Some(offset) = finder.find(&bytes[from..end]) {
            let at = from + offset;
            if self.closes_at(text, at) {
                return Some(at);
            }
            from = at + 1;
        }
        None
    }

    fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let bytes = text.as_bytes();
        let finder = memmem::Finder::new(self.marker.as_bytes());

        let mut out: Option<String> = None;
        let mut last = 0;
        let mut pos = 0;
        // A closer search that failed from `from` up to `end` fails for any
        // later start within that region too.
        let mut dead: Option<(usize, usize)> = None;

        while let Some(offset) = finder.find(&bytes[pos..]) {
            let start = pos + offset;
            let content_start = start + self.marker.len();

            let close = if self.opens_at(text, start) {
                let end = self.search_end(bytes, content_start);
                match dead {
                    Some((from, dead_end)) if content_start >= from && end == dead_end => None,
                    _ => {
                        let found = self.find_close(text, &finder, content_start, end);
                        if found.is_none() {
                            dead = Some((content_start, end));
                        }
                        found
                    }
                }
            } else {
                None
            };

            match close {
                Some(close) => {
                    let out = out.get_or_insert_with(|| String::with_capacity(text.len() + 32));
                    out.push_str(&text[last..start]);
                    out.push_str(self.open_tag);
                    out.push_str(&text[content_start..close]);
                    out.push_str(self.close_tag);
                    last = close + self.marker.len();
                    pos = last;
                }
                // Markers are ASCII, so one byte on is still a char boundary.
                None => pos = start + 1,
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
}

/// Rewrite a single style's markers to tags.
///
/// ```rust
/// use telemark_core::inline::{convert_style, Style};
///
/// assert_eq!(convert_style("a **b** c", Style::Bold), "a <b>b</b> c");
/// assert_eq!(convert_style("2 * 2 = 4", Style::Italic), "2 * 2 = 4");
/// ```
pub fn convert_style(text: &str, style: Style) -> Cow<'_, str> {
    style.rule().apply(text)
}

/// Apply every style in [`Style::ALL`] order.
///
/// Expects entity-escaped text: the output contains tags that must not be
/// escaped afterwards.
pub fn convert_inline_styles(text: &str) -> String {
    let mut buffer: Option<String> = None;
    for style in Style::ALL {
        let current = buffer.as_deref().unwrap_or(text);
        let rewritten = match convert_style(current, style) {
            Cow::Owned(rewritten) => Some(rewritten),
            Cow::Borrowed(_) => None,
        };
        if rewritten.is_some() {
            buffer = rewritten;
        }
    }
    buffer.unwrap_or_else(|| text.to_string())
}
