//! Expression evaluation.

use stencil_ir::{CaseBranch, ExprId, ExprKind, LiteralValue, LogicalOp, Token, UnaryOp};
use stencil_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::environment::Environment;
use crate::errors::undefined_variable;
use crate::operators::{evaluate_binary, negate};
use crate::property::{get_property, set_property};
use crate::value::{Closure, Value};
use crate::EvalError;

impl Interpreter<'_> {
    /// Evaluate an expression in `env`.
    pub(super) fn eval(&self, id: ExprId, env: &Environment) -> Result<Value, EvalError> {
        ensure_sufficient_stack(|| self.eval_inner(id, env))
    }

    fn eval_inner(&self, id: ExprId, env: &Environment) -> Result<Value, EvalError> {
        match self.arena().kind(id) {
            ExprKind::Literal(literal) => Ok(literal_value(literal)),
            ExprKind::Variable { name } => self.lookup(id, name, env),
            ExprKind::Assign { name, value } => {
                let value = self.eval(*value, env)?;
                self.assign(id, name, value.clone(), env)?;
                Ok(value)
            }
            ExprKind::Grouping(inner) => self.eval(*inner, env),

            ExprKind::Unary { op, token, operand } => {
                let operand = self.eval(*operand, env)?;
                match op {
                    UnaryOp::Neg => negate(&operand, token),
                    UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
                }
            }
            ExprKind::Binary {
                left,
                op,
                token,
                right,
            } => {
                let left = self.eval(*left, env)?;
                let right = self.eval(*right, env)?;
                evaluate_binary(&left, *op, &right, token)
            }
            ExprKind::Logical {
                left, op, right, ..
            } => {
                let left = self.eval(*left, env)?;
                let decided = match op {
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::And => !left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.eval(*right, env)
                }
            }
            ExprKind::NullCoalesce { left, right, .. } => {
                let left = self.eval(*left, env)?;
                if left.is_null() {
                    self.eval(*right, env)
                } else {
                    Ok(left)
                }
            }

            ExprKind::Call {
                callee,
                paren,
                args,
            } => self.eval_call(*callee, paren, args, env),
            ExprKind::Pipe { left, token, right } => self.eval_pipe(*left, token, *right, env),

            ExprKind::Get { object, name } => {
                let object = self.eval(*object, env)?;
                get_property(&object, name, self.registry)
            }
            ExprKind::OptionalGet { object, name } => {
                let object = self.eval(*object, env)?;
                if object.is_null() {
                    return Ok(Value::Null);
                }
                get_property(&object, name, self.registry)
            }
            ExprKind::Set {
                object,
                name,
                value,
            } => {
                let object = self.eval(*object, env)?;
                let value = self.eval(*value, env)?;
                set_property(&object, name, value.clone(), self.registry)?;
                Ok(value)
            }

            ExprKind::Case {
                branches,
                otherwise,
                ..
            } => self.eval_case(branches, *otherwise, env),
            ExprKind::Lambda { params, body } => {
                self.track_capture(env);
                Ok(Value::closure(Closure::new(
                    params.iter().map(|p| p.lexeme.clone()).collect(),
                    *body,
                    env.clone(),
                )))
            }
            ExprKind::List { elements, .. } => {
                let items = elements
                    .iter()
                    .map(|e| self.eval(*e, env))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(items))
            }
        }
    }

    fn lookup(&self, id: ExprId, name: &Token, env: &Environment) -> Result<Value, EvalError> {
        let found = match self.resolution.get(id) {
            Some(distance) => env.get_at(distance, &name.lexeme),
            None => self.globals.get(&name.lexeme),
        };
        found.ok_or_else(|| undefined_variable(name))
    }

    fn assign(
        &self,
        id: ExprId,
        name: &Token,
        value: Value,
        env: &Environment,
    ) -> Result<(), EvalError> {
        let assigned = match self.resolution.get(id) {
            Some(distance) => env.assign_at(distance, &name.lexeme, value),
            None => self.globals.assign(&name.lexeme, value),
        };
        assigned.map_err(|_| undefined_variable(name))
    }

    fn eval_case(
        &self,
        branches: &[CaseBranch],
        otherwise: Option<ExprId>,
        env: &Environment,
    ) -> Result<Value, EvalError> {
        for branch in branches {
            if self.eval(branch.condition, env)?.is_truthy() {
                return self.eval(branch.result, env);
            }
        }
        match otherwise {
            Some(expr) => self.eval(expr, env),
            None => Ok(Value::Null),
        }
    }
}

fn literal_value(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Null => Value::Null,
        LiteralValue::Bool(b) => Value::Bool(*b),
        LiteralValue::Int(n) => Value::Int(*n),
        LiteralValue::Long(n) => Value::Long(*n),
        LiteralValue::Float(n) => Value::Float(*n),
        LiteralValue::Double(n) => Value::Double(*n),
        LiteralValue::Decimal(d) => Value::decimal(d.clone()),
        LiteralValue::Str(s) => Value::string(s.as_str()),
    }
}
