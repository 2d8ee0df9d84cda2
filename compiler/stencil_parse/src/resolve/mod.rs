//! Static scope resolution.
//!
//! Walks a parsed [`Program`] once, mirroring the scopes the interpreter
//! creates at runtime (if bodies, loop iterations, insert/rewrite bodies,
//! blocks and lambda parameters). For every variable read or assignment that
//! binds to a local scope, the hop count from the use site to the declaring
//! scope is recorded. Names that are not found locally are left out of the
//! table; the interpreter looks those up directly in the global environment.
//!
//! The global scope is seeded with every built-in and data-context name so a
//! local declaration that shadows one of them resolves to the local.

use rustc_hash::FxHashMap;
use stencil_ir::{ExprArena, ExprId, ExprKind, Program, RewriteBlock, Stmt, Token};
use stencil_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::ResolveError;

/// Hop counts for locally bound variable references.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    depths: FxHashMap<ExprId, usize>,
}

impl Resolution {
    /// Number of scopes to walk up from the use site, or `None` for a
    /// global lookup.
    #[inline]
    pub fn get(&self, expr: ExprId) -> Option<usize> {
        self.depths.get(&expr).copied()
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

/// Resolve `program` against the given global names.
#[tracing::instrument(level = "debug", skip_all)]
pub fn resolve<'g>(
    program: &Program,
    globals: impl IntoIterator<Item = &'g str>,
) -> Result<Resolution, ResolveError> {
    let mut resolver = Resolver::new(&program.arena, globals);
    resolver.resolve_stmts(&program.stmts)?;
    trace!(locals = resolver.depths.len(), "resolved scopes");
    Ok(Resolution {
        depths: resolver.depths,
    })
}

/// Declared names per scope. `false` while the initializer of a `var` is
/// being resolved, `true` once the name is usable.
type Scope = FxHashMap<String, bool>;

struct Resolver<'a> {
    arena: &'a ExprArena,
    scopes: Vec<Scope>,
    depths: FxHashMap<ExprId, usize>,
}

impl<'a> Resolver<'a> {
    fn new<'g>(arena: &'a ExprArena, globals: impl IntoIterator<Item = &'g str>) -> Self {
        let global: Scope = globals
            .into_iter()
            .map(|name| (name.to_owned(), true))
            .collect();
        Resolver {
            arena,
            scopes: vec![global],
            depths: FxHashMap::default(),
        }
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) -> Result<(), ResolveError> {
        stmts.iter().try_for_each(|stmt| self.resolve_stmt(stmt))
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<(), ResolveError> {
        match stmt {
            Stmt::Expression { expr } | Stmt::Do { expr } => self.resolve_expr(*expr),
            Stmt::Var { name, initializer } => {
                self.declare(name)?;
                if let Some(init) = initializer {
                    self.resolve_expr(*init)?;
                }
                self.define(&name.lexeme);
                Ok(())
            }
            Stmt::Block(stmts) => self.scoped(|r| r.resolve_stmts(stmts)),
            Stmt::If {
                condition, body, ..
            } => {
                self.resolve_expr(*condition)?;
                self.scoped(|r| r.resolve_stmts(body))
            }
            Stmt::For {
                variable,
                iterable,
                body,
                ..
            } => {
                self.resolve_expr(*iterable)?;
                self.scoped(|r| {
                    r.define(&variable.lexeme);
                    r.resolve_stmts(body)
                })
            }
            Stmt::Insert(block) | Stmt::Rewrite(block) => self.resolve_rewrite(block),
            Stmt::Verbatim(_) => Ok(()),
        }
    }

    fn resolve_rewrite(&mut self, block: &RewriteBlock) -> Result<(), ResolveError> {
        self.resolve_expr(block.target)?;
        self.scoped(|r| r.resolve_stmts(&block.body))
    }

    fn resolve_expr(&mut self, id: ExprId) -> Result<(), ResolveError> {
        ensure_sufficient_stack(|| self.resolve_expr_inner(id))
    }

    fn resolve_expr_inner(&mut self, id: ExprId) -> Result<(), ResolveError> {
        let arena = self.arena;
        match arena.kind(id) {
            ExprKind::Literal(_) => Ok(()),
            ExprKind::Variable { name } => {
                if !self.in_global_scope()
                    && self.innermost().get(&name.lexeme) == Some(&false)
                {
                    return Err(ResolveError::at(
                        name,
                        format!(
                            "Can't read local variable '{}' in its own initializer.",
                            name.lexeme
                        ),
                    ));
                }
                self.resolve_local(id, &name.lexeme);
                Ok(())
            }
            ExprKind::Assign { name, value } => {
                self.resolve_expr(*value)?;
                self.resolve_local(id, &name.lexeme);
                Ok(())
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(*operand),
            ExprKind::Binary { left, right, .. }
            | ExprKind::Logical { left, right, .. }
            | ExprKind::NullCoalesce { left, right, .. }
            | ExprKind::Pipe { left, right, .. } => {
                self.resolve_expr(*left)?;
                self.resolve_expr(*right)
            }
            ExprKind::Grouping(inner) => self.resolve_expr(*inner),
            ExprKind::Call { callee, args, .. } => {
                self.resolve_expr(*callee)?;
                args.iter().try_for_each(|arg| self.resolve_expr(*arg))
            }
            ExprKind::Get { object, .. } | ExprKind::OptionalGet { object, .. } => {
                self.resolve_expr(*object)
            }
            ExprKind::Set { object, value, .. } => {
                self.resolve_expr(*value)?;
                self.resolve_expr(*object)
            }
            ExprKind::Case {
                branches,
                otherwise,
                ..
            } => {
                for branch in branches {
                    self.resolve_expr(branch.condition)?;
                    self.resolve_expr(branch.result)?;
                }
                match otherwise {
                    Some(expr) => self.resolve_expr(*expr),
                    None => Ok(()),
                }
            }
            ExprKind::Lambda { params, body } => self.scoped(|r| {
                for param in params {
                    if r.innermost().contains_key(&param.lexeme) {
                        return Err(ResolveError::at(
                            param,
                            format!("Duplicate parameter '{}'.", param.lexeme),
                        ));
                    }
                    r.define(&param.lexeme);
                }
                r.resolve_expr(*body)
            }),
            ExprKind::List { elements, .. } => {
                elements.iter().try_for_each(|e| self.resolve_expr(*e))
            }
        }
    }

    /// Record the hop count for `name` if a local scope declares it.
    fn resolve_local(&mut self, id: ExprId, name: &str) {
        let innermost = self.scopes.len() - 1;
        let found = self
            .scopes
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, scope)| scope.contains_key(name));
        if let Some((index, _)) = found {
            self.depths.insert(id, innermost - index);
        }
    }

    fn declare(&mut self, name: &Token) -> Result<(), ResolveError> {
        let global = self.in_global_scope();
        let scope = self.innermost_mut();
        if !global && scope.contains_key(&name.lexeme) {
            return Err(ResolveError::at(
                name,
                format!("Variable '{}' is already declared in this scope.", name.lexeme),
            ));
        }
        // Globals stay readable while their own redeclaration is resolved.
        if !global {
            scope.insert(name.lexeme.clone(), false);
        }
        Ok(())
    }

    fn define(&mut self, name: &str) {
        self.innermost_mut().insert(name.to_owned(), true);
    }

    fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push(Scope::default());
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn in_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    fn innermost(&self) -> &Scope {
        // The global scope is never popped.
        &self.scopes[self.scopes.len() - 1]
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
