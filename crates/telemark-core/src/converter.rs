//! The conversion pipeline.
//!
//! Passes run in a fixed order over an immutable input, each producing a new
//! buffer. Code is pulled out into placeholders before anything else looks
//! at the text and put back after everything else has run.

use std::borrow::Cow;

use crate::blockquote::{combine_blockquotes, QuoteMarker};
use crate::cleanup;
use crate::code::{extract_code, strip_reserved};
use crate::delimiters::repair_delimiters;
use crate::error::{ConvertError, ConvertErrors};
use crate::escape::escape_html;
use crate::inline::convert_inline_styles;
use crate::link::convert_links;
use crate::nesting::nest_tags;
use crate::structure::{convert_headings, convert_lists};

/// Result of a conversion that reports what it had to repair.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// The rendered HTML. Empty when a fatal error stopped conversion.
    pub output: String,
    /// Repairs and failures encountered.
    pub errors: ConvertErrors,
}

impl ConversionResult {
    /// Check if conversion needed no repairs.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if any fatal errors occurred.
    pub fn has_fatal_errors(&self) -> bool {
        self.errors.has_fatal()
    }
}

/// Markdown to Telegram HTML converter.
///
/// Holds only options; a single converter can be shared freely across
/// threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Converter {
    max_input_len: Option<usize>,
}

impl Converter {
    /// Create a converter with no input size ceiling.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject inputs longer than `limit` bytes.
    ///
    /// Every pass is a linear scan, but a few (unclosed emphasis, bracket
    /// soup) can degrade towards quadratic. Services converting untrusted
    /// text should set a ceiling.
    pub fn with_max_input_len(mut self, limit: usize) -> Self {
        self.max_input_len = Some(limit);
        self
    }

    /// Remove any input size ceiling.
    pub fn without_size_limit(mut self) -> Self {
        self.max_input_len = None;
        self
    }

    /// The configured input size ceiling in bytes, if any.
    pub fn max_input_len(&self) -> Option<usize> {
        self.max_input_len
    }

    /// Convert, failing only when the input exceeds the size ceiling.
    ///
    /// Unclosed code delimiters are repaired silently.
    pub fn convert(&self, input: &str) -> Result<String, ConvertError> {
        self.check_len(input)?;
        Ok(self.run(input, &mut ConvertErrors::new()))
    }

    /// Convert, collecting repairs as recoverable errors.
    ///
    /// If the input exceeds the size ceiling the output is empty and the
    /// errors hold a single fatal error.
    pub fn convert_with_recovery(&self, input: &str) -> ConversionResult {
        let mut errors = ConvertErrors::new();
        let output = match self.check_len(input) {
            Ok(()) => self.run(input, &mut errors),
            Err(error) => {
                errors.push(error);
                String::new()
            }
        };
        ConversionResult { output, errors }
    }

    fn check_len(&self, input: &str) -> Result<(), ConvertError> {
        match self.max_input_len {
            Some(limit) if input.len() > limit => {
                log::warn!(
                    "rejecting {} byte input, ceiling is {} bytes",
                    input.len(),
                    limit
                );
                Err(ConvertError::input_too_large(input.len(), limit))
            }
            _ => Ok(()),
        }
    }

    fn run(&self, input: &str, errors: &mut ConvertErrors) -> String {
        let source = strip_reserved(input);
        let repaired = repair_delimiters(&source);
        for repair in &repaired.repairs {
            errors.push(ConvertError::unclosed_delimiter(
                repair.delimiter,
                Some(repair.span),
            ));
        }

        let extracted = extract_code(&repaired.text);
        log::trace!(
            "extracted {} fenced and {} inline code fragments",
            extracted.fenced_count(),
            extracted.inline_count()
        );

        // Line structure before quotes, so heading tags close before the
        // quote around them does.
        let escaped = escape_html(&extracted.text);
        let headed = convert_headings(&escaped);
        let listed = convert_lists(&headed);
        let quoted = combine_blockquotes(&listed, QuoteMarker::Escaped);
        let styled = convert_inline_styles(&quoted);
        log::trace!("styled buffer is {} bytes", styled.len());

        let uncited = cleanup::strip_citations(&styled);
        let linked = convert_links(&uncited);
        let restored = extracted.reinsert(&linked);
        let nested = nest_tags(&restored);
        if matches!(nested, Cow::Owned(_)) {
            log::trace!("split crossed tags");
        }
        let output = cleanup::finish(&nested);

        log::debug!(
            "converted {} bytes to {} bytes ({} code blocks, {} inline code, {} repairs)",
            input.len(),
            output.len(),
            extracted.fenced_count(),
            extracted.inline_count(),
            repaired.repairs.len()
        );
        output
    }
}

/// Convert with default options.
///
/// Total over all inputs: never fails and never panics.
///
/// ```rust
/// assert_eq!(
///     telemark_core::convert("This is **bold** text"),
///     "This is <b>bold</b> text"
/// );
/// ```
pub fn convert(input: &str) -> String {
    Converter::new().run(input, &mut ConvertErrors::new())
}
