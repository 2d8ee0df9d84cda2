//! Statement execution.
//!
//! Every statement appends its output to a caller-provided buffer, so a
//! render allocates one vector per loop iteration at most.

use rayon::prelude::*;
use stencil_ir::{RewriteBlock, Stmt, Token, XmlInputToken, XmlOutputToken};
use tracing::trace;

use super::Interpreter;
use crate::environment::Environment;
use crate::errors::{not_iterable, rewriter_required};
use crate::value::{Value, ValueMap};
use crate::EvalError;

impl Interpreter<'_> {
    pub(super) fn exec_stmts(
        &self,
        stmts: &[Stmt],
        env: &Environment,
        out: &mut Vec<XmlOutputToken>,
    ) -> Result<(), EvalError> {
        stmts.iter().try_for_each(|stmt| self.exec(stmt, env, out))
    }

    fn exec(
        &self,
        stmt: &Stmt,
        env: &Environment,
        out: &mut Vec<XmlOutputToken>,
    ) -> Result<(), EvalError> {
        match stmt {
            Stmt::Expression { expr } => {
                let value = self.eval(*expr, env)?;
                out.push(XmlOutputToken::text(value.to_output_string()));
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.eval(*init, env)?,
                    None => Value::Null,
                };
                env.define(name.lexeme.as_str(), value);
                Ok(())
            }
            Stmt::Block(stmts) => self.exec_stmts(stmts, &env.child(), out),
            Stmt::If {
                condition, body, ..
            } => {
                if self.eval(*condition, env)?.is_truthy() {
                    self.exec_stmts(body, &env.child(), out)?;
                }
                Ok(())
            }
            Stmt::For {
                variable,
                iterable,
                body,
                ..
            } => {
                let iterable = self.eval(*iterable, env)?;
                let items = iteration_items(&iterable, variable)?;
                self.exec_for(variable, items, body, env, out)
            }
            Stmt::Do { expr } => {
                self.eval(*expr, env)?;
                Ok(())
            }
            Stmt::Verbatim(token) => {
                out.push(match token {
                    XmlInputToken::Raw(raw) => XmlOutputToken::Raw(raw.clone()),
                    XmlInputToken::Sentinel => XmlOutputToken::Sentinel,
                    XmlInputToken::Group(_) => {
                        return Err(EvalError::fatal(
                            "Verbatim statement cannot contain a template group.",
                        ))
                    }
                });
                Ok(())
            }
            Stmt::Insert(block) | Stmt::Rewrite(block) => self.exec_rewrite(block, env, out),
        }
    }

    fn exec_for(
        &self,
        variable: &Token,
        items: Vec<Value>,
        body: &[Stmt],
        env: &Environment,
        out: &mut Vec<XmlOutputToken>,
    ) -> Result<(), EvalError> {
        trace!(variable = %variable.lexeme, items = items.len(), "for loop");
        let iteration = |item: Value, out: &mut Vec<XmlOutputToken>| {
            let scope = env.child();
            scope.define(variable.lexeme.as_str(), item);
            self.exec_stmts(body, &scope, out)
        };

        match &self.pool {
            Some(pool) if items.len() > 1 => {
                // Each iteration renders into its own buffer; `collect`
                // keeps them in source order.
                let chunks = pool.as_rayon().install(|| {
                    items
                        .into_par_iter()
                        .map(|item| {
                            let mut chunk = Vec::new();
                            iteration(item, &mut chunk)?;
                            Ok(chunk)
                        })
                        .collect::<Result<Vec<_>, EvalError>>()
                })?;
                out.extend(chunks.into_iter().flatten());
                Ok(())
            }
            _ => items.into_iter().try_for_each(|item| iteration(item, out)),
        }
    }

    /// `insert`/`rewrite`: a null target renders the body unchanged,
    /// otherwise the body output goes through the rewriter.
    fn exec_rewrite(
        &self,
        block: &RewriteBlock,
        env: &Environment,
        out: &mut Vec<XmlOutputToken>,
    ) -> Result<(), EvalError> {
        let target = self.eval(block.target, env)?;
        let rewriter = match target {
            Value::Null => return self.exec_stmts(&block.body, &env.child(), out),
            Value::Rewriter(rewriter) => rewriter,
            _ => return Err(rewriter_required(&block.keyword)),
        };

        let mut body = Vec::new();
        self.exec_stmts(&block.body, &env.child(), &mut body)?;
        let rewritten = rewriter
            .rewrite(body)
            .map_err(|err| EvalError::runtime(err.message, &block.keyword))?;
        trace!(keyword = %block.keyword.lexeme, tokens = rewritten.len(), "rewrote block");
        out.extend(rewritten);
        Ok(())
    }
}

/// Values a `for` loop visits. Maps yield `{key, value}` entries in
/// insertion order.
fn iteration_items(iterable: &Value, variable: &Token) -> Result<Vec<Value>, EvalError> {
    match iterable {
        Value::List(items) => Ok(items.to_vec()),
        Value::Map(map) => Ok(map
            .snapshot()
            .iter()
            .map(|(key, value)| {
                let mut entry = ValueMap::new();
                entry.insert("key", Value::string(key));
                entry.insert("value", value.clone());
                Value::map(entry)
            })
            .collect()),
        other => Err(not_iterable(other.type_name(), variable)),
    }
}
