//! Evaluation errors.
//!
//! Runtime failures are bound to the token that caused them. Constructors
//! for the common cases live here so the messages stay in one place.

use stencil_diagnostic::{ErrorKind, TemplateError};
use stencil_ir::{Span, Token};

/// Whether an evaluation error is a template problem or an engine bug.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    Runtime,
    Fatal,
}

/// A render failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    pub span: Span,
    pub lexeme: String,
}

impl EvalError {
    pub fn runtime(message: impl Into<String>, token: &Token) -> Self {
        EvalError {
            kind: EvalErrorKind::Runtime,
            message: message.into(),
            span: token.span,
            lexeme: token.lexeme.clone(),
        }
    }

    /// An invariant violation with no meaningful source location.
    pub fn fatal(message: impl Into<String>) -> Self {
        EvalError {
            kind: EvalErrorKind::Fatal,
            message: message.into(),
            span: Span::DUMMY,
            lexeme: String::new(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == EvalErrorKind::Fatal
    }
}

impl From<EvalError> for TemplateError {
    fn from(err: EvalError) -> Self {
        let kind = match err.kind {
            EvalErrorKind::Runtime => ErrorKind::Runtime,
            EvalErrorKind::Fatal => ErrorKind::Fatal,
        };
        TemplateError::new(kind, err.message, err.span, err.lexeme)
    }
}

/// Failure inside a native function.
///
/// `Message` is re-bound to the calling token by the interpreter. `Eval`
/// carries an error raised while a native called back into a template
/// function; it already has its own location and passes through unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NativeError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl NativeError {
    pub fn new(message: impl Into<String>) -> Self {
        NativeError::Message(message.into())
    }

    /// Bind a message error to `token`.
    pub fn at(self, token: &Token) -> EvalError {
        match self {
            NativeError::Message(message) => EvalError::runtime(message, token),
            NativeError::Eval(err) => err,
        }
    }
}

/// Failure inside a stream rewriter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RewriteError {
    pub message: String,
}

impl RewriteError {
    pub fn new(message: impl Into<String>) -> Self {
        RewriteError {
            message: message.into(),
        }
    }
}

// Variables

#[cold]
pub fn undefined_variable(name: &Token) -> EvalError {
    EvalError::runtime(format!("Undefined variable '{}'.", name.lexeme), name)
}

// Arithmetic

#[cold]
pub fn division_by_zero(op: &Token) -> EvalError {
    EvalError::runtime("Division by zero.", op)
}

#[cold]
pub fn modulo_by_zero(op: &Token) -> EvalError {
    EvalError::runtime("Modulo by zero.", op)
}

#[cold]
pub fn operand_must_be_number(op: &Token) -> EvalError {
    EvalError::runtime("Operand must be a number.", op)
}

// Calls

#[cold]
pub fn wrong_arg_count(expected: impl std::fmt::Display, got: usize, token: &Token) -> EvalError {
    EvalError::runtime(format!("Expected {expected} arguments but got {got}."), token)
}

#[cold]
pub fn not_callable(paren: &Token) -> EvalError {
    EvalError::runtime("Can only call functions.", paren)
}

#[cold]
pub fn pipe_target_not_callable(pipe: &Token) -> EvalError {
    EvalError::runtime("Right side of pipe must be callable.", pipe)
}

#[cold]
pub fn pipe_target_without_params(arity: usize, pipe: &Token) -> EvalError {
    EvalError::runtime(
        format!("Pipe operator requires function with at least 1 parameter, got {arity}."),
        pipe,
    )
}

// Properties

#[cold]
pub fn get_on_null(name: &Token) -> EvalError {
    EvalError::runtime(format!("Cannot get property '{}' of null.", name.lexeme), name)
}

#[cold]
pub fn set_on_null(name: &Token) -> EvalError {
    EvalError::runtime(format!("Cannot set property '{}' on null.", name.lexeme), name)
}

#[cold]
pub fn undefined_property(type_name: &str, name: &Token) -> EvalError {
    EvalError::runtime(
        format!("Undefined property '{}' on {type_name}.", name.lexeme),
        name,
    )
}

#[cold]
pub fn read_only_property(type_name: &str, name: &Token) -> EvalError {
    EvalError::runtime(
        format!("Cannot set read-only property '{}' on {type_name}.", name.lexeme),
        name,
    )
}

#[cold]
pub fn cannot_set_property(type_name: &str, name: &Token) -> EvalError {
    EvalError::runtime(
        format!("Cannot set property '{}' on {type_name}.", name.lexeme),
        name,
    )
}

// Statements

#[cold]
pub fn not_iterable(type_name: &str, variable: &Token) -> EvalError {
    EvalError::runtime(
        format!("'for' loop expression cannot be iterated over: {type_name}."),
        variable,
    )
}

#[cold]
pub fn rewriter_required(keyword: &Token) -> EvalError {
    EvalError::runtime(
        format!("Need a stream rewriter for `{}` statement.", keyword.lexeme),
        keyword,
    )
}
