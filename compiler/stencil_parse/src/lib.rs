//! Recursive descent parser for Stencil templates.
//!
//! Input is the expanded document stream: raw XML tokens become
//! `Verbatim` statements and every template group is parsed from its own
//! token list. Block groups (`for`, `if`, `insert`, `rewrite`) own the
//! statements up to their `{end}`. Expressions go into a flat `ExprArena`.
//!
//! The [`resolve`] module computes, per render, how many scopes each
//! variable reference has to walk up at runtime.

mod cursor;
mod error;
mod grammar;
pub mod resolve;

use stencil_ir::{ExprArena, GroupTable, Program, XmlInputToken};
use tracing::debug;

pub use cursor::Cursor;
pub use error::{ParseError, ResolveError};
pub use resolve::{resolve, Resolution};

/// Parser state.
pub struct Parser<'a> {
    stream: &'a [XmlInputToken],
    groups: &'a GroupTable,
    pos: usize,
    cursor: Cursor<'a>,
    arena: ExprArena,
}

impl<'a> Parser<'a> {
    pub fn new(stream: &'a [XmlInputToken], groups: &'a GroupTable) -> Self {
        Parser {
            stream,
            groups,
            pos: 0,
            cursor: Cursor::new(&[]),
            arena: ExprArena::new(),
        }
    }

    /// Parse the whole stream into a program.
    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let stmts = self.parse_body(None)?;
        debug!(
            stmts = stmts.len(),
            exprs = self.arena.len(),
            "parsed template"
        );
        Ok(Program::new(stmts, self.arena))
    }
}

/// Parse an expanded document stream.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = stream.len()))]
pub fn parse(stream: &[XmlInputToken], groups: &GroupTable) -> Result<Program, ParseError> {
    Parser::new(stream, groups).parse_program()
}
