//! Stencil IR - shared data structures for the template engine.
//!
//! This crate contains the types every pipeline stage agrees on:
//! - Spans for document locations
//! - Tokens produced by the template scanner
//! - AST nodes (flat expression arena plus statement tree)
//! - Raw XML tokens and template groups consumed by the expander
//! - Output tokens produced by the interpreter
//!
//! # Design Philosophy
//!
//! - **Flatten expressions**: no `Box<Expr>`, use `ExprId(u32)` indices
//! - **Index handles for cycles**: template-group partners are `GroupId`s
//!   into a `GroupTable`, never direct references
//! - **Immutable after build**: a parsed `Program` is shared read-only across
//!   renders and worker threads

pub mod ast;
mod output;
mod span;
mod token;
mod xml;

pub use ast::{
    BinaryOp, CaseBranch, Expr, ExprArena, ExprId, ExprKind, LiteralValue, LogicalOp, Program,
    RewriteBlock, Stmt, UnaryOp,
};
pub use output::{escape_xml, serialize, XmlOutputToken};
pub use span::{Span, SpanError};
pub use token::{Literal, Token, TokenKind};
pub use xml::{
    ExpansionDirection, ExpansionTarget, GroupId, GroupKind, GroupTable, TagPartType,
    TemplateGroup, XmlInputToken, XmlRawToken,
};
