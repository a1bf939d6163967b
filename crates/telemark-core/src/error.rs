use crate::span::Span;
use std::fmt;

/// Error kinds for categorizing conversion problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertErrorKind {
    /// Input is longer than the configured ceiling
    InputTooLarge,
    /// A code fence or backtick was left open and had to be closed
    UnclosedDelimiter,
}

/// A conversion error with location and recovery information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    /// Human-readable error message
    pub message: String,
    /// Location in the repaired input, when there is one
    pub span: Option<Span>,
    /// Error categorization
    pub kind: ConvertErrorKind,
    /// Whether conversion still produced output
    pub recoverable: bool,
}

impl ConvertError {
    /// Create an error for input rejected by the size ceiling.
    pub fn input_too_large(len: usize, limit: usize) -> Self {
        Self {
            message: format!("input is {} bytes, limit is {}", len, limit),
            span: None,
            kind: ConvertErrorKind::InputTooLarge,
            recoverable: false,
        }
    }

    /// Create an error for a delimiter the repairer had to close.
    pub fn unclosed_delimiter(delimiter: &str, span: Option<Span>) -> Self {
        Self {
            message: format!("unclosed {}", delimiter),
            span,
            kind: ConvertErrorKind::UnclosedDelimiter,
            recoverable: true,
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " at bytes {}..{}", span.start, span.end)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConvertError {}

/// Errors collected while converting one input.
#[derive(Debug, Clone, Default)]
pub struct ConvertErrors {
    errors: Vec<ConvertError>,
}

impl ConvertErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ConvertError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConvertError> {
        self.errors.iter()
    }

    /// Check if any non-recoverable errors exist.
    pub fn has_fatal(&self) -> bool {
        self.errors.iter().any(|e| !e.recoverable)
    }
}

impl IntoIterator for ConvertErrors {
    type Item = ConvertError;
    type IntoIter = std::vec::IntoIter<ConvertError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
