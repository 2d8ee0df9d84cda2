use stencil_diagnostic::{ErrorKind, TemplateError};
use stencil_ir::Span;
use stencil_lexer::LexError;

/// Failure while reading the document or laying out its control groups.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// Markup that cannot be tokenized, or a group that is never closed.
    #[error("{message}")]
    Malformed {
        message: String,
        span: Span,
        lexeme: String,
    },
    #[error(transparent)]
    Lex(#[from] LexError),
    /// Unbalanced control groups or an expansion that cannot be carried out.
    #[error("{message}")]
    Structure {
        message: String,
        span: Span,
        lexeme: String,
    },
}

impl XmlError {
    pub(crate) fn malformed(message: impl Into<String>, span: Span, lexeme: impl Into<String>) -> Self {
        XmlError::Malformed {
            message: message.into(),
            span,
            lexeme: lexeme.into(),
        }
    }

    pub(crate) fn structure(message: impl Into<String>, span: Span, lexeme: impl Into<String>) -> Self {
        XmlError::Structure {
            message: message.into(),
            span,
            lexeme: lexeme.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            XmlError::Malformed { message, .. } | XmlError::Structure { message, .. } => message,
            XmlError::Lex(err) => &err.message,
        }
    }
}

impl From<XmlError> for TemplateError {
    fn from(err: XmlError) -> Self {
        match err {
            XmlError::Malformed {
                message,
                span,
                lexeme,
            } => TemplateError::new(ErrorKind::Syntax, message, span, lexeme),
            XmlError::Lex(err) => err.into(),
            XmlError::Structure {
                message,
                span,
                lexeme,
            } => TemplateError::new(ErrorKind::Structural, message, span, lexeme),
        }
    }
}
