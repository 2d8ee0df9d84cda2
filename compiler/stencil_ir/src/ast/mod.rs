//! Template AST.
//!
//! Expressions live in a flat [`ExprArena`] and refer to each other through
//! [`ExprId`] indices. Statements form a small tree: block-shaped statements
//! (`for`, `if`, `insert`, `rewrite`) own their bodies directly.
//!
//! Operator nodes keep the token they were parsed from so runtime errors can
//! point at the exact lexeme that failed.

mod operators;
mod stmt;

use std::fmt;

use bigdecimal::BigDecimal;

use crate::{Span, Token};

pub use operators::{BinaryOp, LogicalOp, UnaryOp};
pub use stmt::{RewriteBlock, Stmt};

/// Index into the expression arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// Literal values that can appear directly in template source.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(BigDecimal),
    Str(String),
}

/// One `when <condition> then <result>` arm of a `case` expression.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseBranch {
    pub condition: ExprId,
    pub result: ExprId,
}

/// Expression node kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(LiteralValue),
    Variable {
        name: Token,
    },
    Assign {
        name: Token,
        value: ExprId,
    },
    Unary {
        op: UnaryOp,
        token: Token,
        operand: ExprId,
    },
    Binary {
        left: ExprId,
        op: BinaryOp,
        token: Token,
        right: ExprId,
    },
    /// Short-circuiting `and` / `or`.
    Logical {
        left: ExprId,
        op: LogicalOp,
        token: Token,
        right: ExprId,
    },
    /// `left ?? right`; `right` is only evaluated when `left` is null.
    NullCoalesce {
        left: ExprId,
        token: Token,
        right: ExprId,
    },
    Grouping(ExprId),
    Call {
        callee: ExprId,
        paren: Token,
        args: Vec<ExprId>,
    },
    Get {
        object: ExprId,
        name: Token,
    },
    /// `object.?name`
    OptionalGet {
        object: ExprId,
        name: Token,
    },
    Set {
        object: ExprId,
        name: Token,
        value: ExprId,
    },
    Case {
        keyword: Token,
        branches: Vec<CaseBranch>,
        otherwise: Option<ExprId>,
    },
    Lambda {
        params: Vec<Token>,
        body: ExprId,
    },
    Pipe {
        left: ExprId,
        token: Token,
        right: ExprId,
    },
    List {
        bracket: Token,
        elements: Vec<ExprId>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Contiguous storage for all expressions of one program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an expression and return its id.
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let index = u32::try_from(self.exprs.len()).unwrap_or(u32::MAX);
        self.exprs.push(expr);
        ExprId::new(index)
    }

    /// Overwrite the node at `id`, e.g. when a parsed operand turns out to
    /// be an assignment target.
    pub fn replace(&mut self, id: ExprId, expr: Expr) {
        self.exprs[id.index()] = expr;
    }

    /// Look up an expression.
    ///
    /// Ids are only ever minted by [`ExprArena::alloc`] on the same arena,
    /// so indexing is in bounds for every id a parser hands out.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.get(id).kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.get(id).span
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// A parsed template: top-level statements plus the arena their
/// expressions live in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub arena: ExprArena,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>, arena: ExprArena) -> Self {
        Program { stmts, arena }
    }
}
