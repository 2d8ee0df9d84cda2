//! Parse and resolve errors.

use stencil_diagnostic::{ErrorKind, TemplateError};
use stencil_ir::{Span, Token};

/// Malformed template syntax, bound to the offending token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub lexeme: String,
}

impl ParseError {
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            span: token.span,
            lexeme: token.lexeme.clone(),
        }
    }
}

impl From<ParseError> for TemplateError {
    fn from(err: ParseError) -> Self {
        TemplateError::new(ErrorKind::Syntax, err.message, err.span, err.lexeme)
    }
}

/// Malformed scoping found by the resolver.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResolveError {
    pub message: String,
    pub span: Span,
    pub lexeme: String,
}

impl ResolveError {
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        ResolveError {
            message: message.into(),
            span: token.span,
            lexeme: token.lexeme.clone(),
        }
    }
}

impl From<ResolveError> for TemplateError {
    fn from(err: ResolveError) -> Self {
        TemplateError::new(ErrorKind::Syntax, err.message, err.span, err.lexeme)
    }
}
