//! Calls: template closures, native functions and the pipe operator.

use stencil_ir::{ExprId, ExprKind, Token};

use super::Interpreter;
use crate::environment::Environment;
use crate::errors::{
    not_callable, pipe_target_not_callable, pipe_target_without_params, wrong_arg_count,
};
use crate::value::{Closure, Invoke, Value};
use crate::{EvalError, NativeError};

impl Interpreter<'_> {
    /// `callee(args...)`; errors bind to `token`.
    pub(super) fn call_value(
        &self,
        callee: &Value,
        args: Vec<Value>,
        token: &Token,
        not_callable_err: fn(&Token) -> EvalError,
    ) -> Result<Value, EvalError> {
        match callee {
            Value::Function(closure) => {
                if args.len() != closure.arity() {
                    return Err(wrong_arg_count(closure.arity(), args.len(), token));
                }
                self.call_closure(closure, args)
            }
            Value::Native(native) => {
                if !native.arity().accepts(args.len()) {
                    return Err(wrong_arg_count(native.arity(), args.len(), token));
                }
                native.call(self, &args).map_err(|err| err.at(token))
            }
            _ => Err(not_callable_err(token)),
        }
    }

    pub(super) fn call_closure(
        &self,
        closure: &Closure,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        let env = closure.env.child();
        for (param, arg) in closure.params.iter().zip(args) {
            env.define(param.as_str(), arg);
        }
        self.eval(closure.body, &env)
    }

    pub(super) fn eval_call(
        &self,
        callee: ExprId,
        paren: &Token,
        args: &[ExprId],
        env: &Environment,
    ) -> Result<Value, EvalError> {
        let callee = self.eval(callee, env)?;
        let args = self.eval_args(args, env, Vec::with_capacity(args.len()))?;
        self.call_value(&callee, args, paren, not_callable)
    }

    /// `left | right`.
    ///
    /// A call on the right gets the left value prepended to its arguments.
    /// Anything else must evaluate to a function taking at least one
    /// parameter, which is called with the left value alone.
    pub(super) fn eval_pipe(
        &self,
        left: ExprId,
        token: &Token,
        right: ExprId,
        env: &Environment,
    ) -> Result<Value, EvalError> {
        let left = self.eval(left, env)?;

        if let ExprKind::Call { callee, args, .. } = self.arena().kind(right) {
            let callee = self.eval(*callee, env)?;
            let mut first = Vec::with_capacity(args.len() + 1);
            first.push(left);
            let args = self.eval_args(args, env, first)?;
            return self.call_value(&callee, args, token, pipe_target_not_callable);
        }

        let target = self.eval(right, env)?;
        let min_params = match &target {
            Value::Function(closure) => closure.arity(),
            Value::Native(native) => native.arity().min(),
            _ => return Err(pipe_target_not_callable(token)),
        };
        if min_params < 1 {
            return Err(pipe_target_without_params(min_params, token));
        }
        self.call_value(&target, vec![left], token, pipe_target_not_callable)
    }

    fn eval_args(
        &self,
        args: &[ExprId],
        env: &Environment,
        mut out: Vec<Value>,
    ) -> Result<Vec<Value>, EvalError> {
        for arg in args {
            out.push(self.eval(*arg, env)?);
        }
        Ok(out)
    }
}

/// Callback path for higher-order built-ins.
impl Invoke for Interpreter<'_> {
    fn invoke(&self, callee: &Value, args: Vec<Value>) -> Result<Value, NativeError> {
        match callee {
            Value::Function(closure) => {
                if args.len() != closure.arity() {
                    return Err(NativeError::new(format!(
                        "Expected {} arguments but got {}.",
                        closure.arity(),
                        args.len()
                    )));
                }
                Ok(self.call_closure(closure, args)?)
            }
            Value::Native(native) => {
                if !native.arity().accepts(args.len()) {
                    return Err(NativeError::new(format!(
                        "Expected {} arguments but got {}.",
                        native.arity(),
                        args.len()
                    )));
                }
                native.call(self, &args)
            }
            _ => Err(NativeError::new("Can only call functions.")),
        }
    }
}
