//! Template group scanner.
//!
//! Turns the source of one template group, e.g. `{for row in rows @w:tr}`,
//! into a token vector that starts with `DelimiterOpen` and ends with
//! `DelimiterClose`. The group text has already been lifted out of the XML
//! (possibly from several text runs) and unescaped, so a [`GroupSource`]
//! carries a per-byte map back to document offsets; every token span points
//! into the original document.

mod cursor;
mod scanner;
mod source;

use stencil_diagnostic::{ErrorKind, TemplateError};
use stencil_ir::{Span, Token};

pub use scanner::Scanner;
pub use source::GroupSource;

/// Opening and closing delimiters of template groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Delimiters {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters::new("{", "}")
    }
}

/// Malformed group source.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
    pub lexeme: String,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span, lexeme: impl Into<String>) -> Self {
        LexError {
            message: message.into(),
            span,
            lexeme: lexeme.into(),
        }
    }
}

impl From<LexError> for TemplateError {
    fn from(err: LexError) -> Self {
        TemplateError::new(ErrorKind::Syntax, err.message, err.span, err.lexeme)
    }
}

/// Scan a complete group (delimiters included).
pub fn scan_group(source: &GroupSource, delimiters: &Delimiters) -> Result<Vec<Token>, LexError> {
    Scanner::new(source, delimiters).scan()
}
