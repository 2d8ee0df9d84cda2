//! Statement nodes.

use crate::{ExprId, Token, XmlInputToken};

/// Body of an `insert` or `rewrite` block.
#[derive(Clone, Debug, PartialEq)]
pub struct RewriteBlock {
    pub keyword: Token,
    /// Evaluates to the stream rewriter (or null to pass the body through).
    pub target: ExprId,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// `{expr}`: evaluate and emit as escaped text.
    Expression { expr: ExprId },
    /// `{var name = init}`
    Var {
        name: Token,
        initializer: Option<ExprId>,
    },
    /// Statements run in a fresh child scope.
    Block(Vec<Stmt>),
    /// `{if cond}...{end}`; the body runs in its own scope.
    If {
        keyword: Token,
        condition: ExprId,
        body: Vec<Stmt>,
    },
    /// `{for x in iterable}...{end}`; one scope per iteration.
    For {
        keyword: Token,
        variable: Token,
        iterable: ExprId,
        body: Vec<Stmt>,
    },
    /// `{do expr}`: side effects only.
    Do { expr: ExprId },
    /// A piece of the surrounding document copied to the output unchanged.
    Verbatim(XmlInputToken),
    Insert(RewriteBlock),
    Rewrite(RewriteBlock),
}
