//! Error reporting for the template engine.
//!
//! Every stage converts its own error type into a [`TemplateError`] tagged
//! with one of four [`ErrorKind`]s:
//! - **Syntax**: malformed template source
//! - **Structural**: control groups that cannot be paired or expanded
//! - **Runtime**: type mismatches, undefined variables, bad calls
//! - **Fatal**: engine invariant violations, never caused by valid input
//!
//! All kinds abort the current compile or render. Errors carry the document
//! span and lexeme of the token they are bound to; [`LineOffsetTable`] turns
//! spans into line/column pairs for messages.

mod span_utils;

use std::fmt;

use stencil_ir::{Span, Token};

pub use span_utils::LineOffsetTable;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Structural,
    Runtime,
    Fatal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Structural => "structural",
            ErrorKind::Runtime => "runtime",
            ErrorKind::Fatal => "internal",
        })
    }
}

/// A compile or render failure bound to a location in the document.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error at '{lexeme}': {message}")]
pub struct TemplateError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub lexeme: String,
}

impl TemplateError {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        span: Span,
        lexeme: impl Into<String>,
    ) -> Self {
        TemplateError {
            kind,
            message: message.into(),
            span,
            lexeme: lexeme.into(),
        }
    }

    /// Error bound to a scanned token.
    pub fn at_token(kind: ErrorKind, message: impl Into<String>, token: &Token) -> Self {
        Self::new(kind, message, token.span, token.lexeme.clone())
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Fatal
    }

    /// Render as `line:col: kind error at 'lexeme': message` against the
    /// document the span points into.
    pub fn describe(&self, source: &str) -> String {
        let table = LineOffsetTable::build(source);
        let (line, col) = table.offset_to_line_col(source, self.span.start);
        format!("{line}:{col}: {self}")
    }
}

#[cfg(test)]
mod tests;
