//! # Telemark Core
//!
//! Converts the Markdown dialect produced by chat LLMs into the HTML subset
//! that Telegram's `parse_mode=HTML` renderer accepts.
//!
//! The conversion is a pure string-to-string function. There is no I/O and no
//! shared state; every call is independent.
//!
//! ## Quick Start
//!
//! ```rust
//! let html = telemark_core::convert("# Result\nThis is **bold** and `code`.");
//! assert_eq!(html, "<b>Result</b>\nThis is <b>bold</b> and <code>code</code>.");
//! ```
//!
//! ## Size Ceiling and Recovery
//!
//! ```rust
//! use telemark_core::{ConvertErrorKind, Converter};
//!
//! let converter = Converter::new().with_max_input_len(64 * 1024);
//!
//! // Unclosed fences are repaired, and the repair is reported.
//! let result = converter.convert_with_recovery("```rust\nfn main() {}");
//! assert!(result.output.starts_with("<pre><code class=\"language-rust\">"));
//! assert_eq!(result.errors.len(), 1);
//!
//! // Oversized input fails fast.
//! let err = converter.convert(&"a".repeat(100_000)).unwrap_err();
//! assert_eq!(err.kind, ConvertErrorKind::InputTooLarge);
//! ```
//!
//! ## Pipeline
//!
//! 1. [`delimiters`]: close unterminated fences and backticks
//! 2. [`code`]: swap code for placeholders, escaping its content
//! 3. [`escape`]: escape `&`, `<`, `>` in the remaining text
//! 4. [`structure`]: headings, then list bullets
//! 5. [`blockquote`]: merge `>` and `**>` lines
//! 6. [`inline`]: bold, underline, strikethrough, spoiler, italic
//! 7. [`cleanup`]: drop citation markers
//! 8. [`link`]: links and images
//! 9. [`code`]: reinsert code HTML
//! 10. [`nesting`]: split tags that cross
//! 11. [`cleanup`]: collapse blank lines, trim
//!
//! Do not run the converter on its own output: literal `&lt;` would be
//! escaped a second time.
//!
//! U+E000 and U+E001 delimit the internal code placeholders. Both are
//! removed from the input before conversion, so they never reach the output.

pub mod blockquote;
pub mod cleanup;
pub mod code;
pub mod converter;
pub mod delimiters;
pub mod error;
pub mod escape;
pub mod inline;
pub mod lexer;
pub mod link;
pub mod nesting;
pub mod span;
pub mod structure;

pub use converter::{convert, ConversionResult, Converter};
pub use error::{ConvertError, ConvertErrorKind, ConvertErrors};
