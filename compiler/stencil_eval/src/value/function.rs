//! Callable values: template closures and native functions.

use std::fmt;
use std::sync::Arc;

use stencil_ir::ExprId;

use super::Value;
use crate::environment::Environment;
use crate::NativeError;

/// A template lambda (`x -> x * 2`).
///
/// The body is an expression in the program being rendered. The render that
/// created a closure empties its captured scopes when it ends, so a closure
/// kept past that point sees no bindings.
#[derive(Clone, Debug)]
pub struct Closure {
    pub params: Vec<String>,
    pub body: ExprId,
    /// Environment the lambda was evaluated in.
    pub env: Environment,
}

impl Closure {
    pub fn new(params: Vec<String>, body: ExprId, env: Environment) -> Self {
        Closure { params, body, env }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body && self.params == other.params && self.env.ptr_eq(&other.env)
    }
}

/// Accepted argument counts of a native function.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Inclusive range.
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => (min..=max).contains(&count),
        }
    }

    /// Smallest accepted count.
    pub fn min(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::Range(n, _) => n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::Range(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

/// Calls back into the interpreter from native code.
///
/// Higher-order built-ins such as `$map` receive either a template closure
/// or another native function; both are invoked through this trait.
pub trait Invoke {
    fn invoke(&self, callee: &Value, args: Vec<Value>) -> Result<Value, NativeError>;
}

/// Native function body.
pub type NativeFn = dyn Fn(&dyn Invoke, &[Value]) -> Result<Value, NativeError> + Send + Sync;

/// A host-provided function value.
#[derive(Clone)]
pub struct NativeFunction {
    name: &'static str,
    arity: Arity,
    func: Arc<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: &'static str,
        arity: Arity,
        func: impl Fn(&dyn Invoke, &[Value]) -> Result<Value, NativeError> + Send + Sync + 'static,
    ) -> Self {
        NativeFunction {
            name,
            arity,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Run the body. Arity is checked by the caller.
    pub fn call(&self, invoker: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
        (self.func)(invoker, args)
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.func, &b.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}
