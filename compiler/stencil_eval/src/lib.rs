//! Stencil evaluator.
//!
//! Runs a parsed template [`Program`] against a data context and produces
//! the output token stream. The pieces:
//!
//! - [`value`]: runtime values, closures, native functions, host objects
//! - [`environment`]: lexical scope chain shared with closures
//! - [`operators`]: arithmetic, comparison and equality across numeric tiers
//! - [`builtins`]: the `$`-prefixed global function library
//! - [`rewriter`]: stream rewriters behind `insert` and `rewrite`
//!
//! A render owns a fresh global scope. Built-ins are bound first, then the
//! data keys, so a data key named like a built-in wins.

pub mod builtins;
pub mod environment;
mod errors;
mod interpreter;
pub mod operators;
mod pool;
mod property;
pub mod rewriter;
pub mod value;

use stencil_diagnostic::TemplateError;
use stencil_ir::{Program, XmlOutputToken};
use tracing::debug;

pub use builtins::NumberSymbols;
pub use environment::Environment;
pub use errors::{EvalError, EvalErrorKind, NativeError, RewriteError};
pub use interpreter::Interpreter;
pub use pool::RenderPool;
pub use property::{get_property, set_property};
pub use rewriter::{
    FnRewriter, IdentityRewriter, LineBreakRewriter, LineBreaks, RawXmlRewriter,
    XmlStreamRewriter,
};
pub use value::{AccessorRegistry, Arity, HostObject, Invoke, Value, ValueMap};

/// Per-render settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render `for` iterations on a worker pool. Output order is unchanged.
    pub parallel_loops: bool,
    /// Worker count for parallel loops; `0` picks one per core.
    pub worker_threads: usize,
    /// Separators used by `$formatNumber` and `$format` on numbers.
    pub number_symbols: NumberSymbols,
    /// Line-break markup for `$lineBreaksToTags`; `None` makes it an error.
    pub line_breaks: Option<LineBreaks>,
}

/// Render `program` with `data` bound as globals.
///
/// Parallel loops run on `pool`. Without one, a render that asks for
/// parallel loops starts a pool of its own.
#[tracing::instrument(level = "debug", skip_all, fields(keys = data.len()))]
pub fn render_program(
    program: &Program,
    data: &ValueMap,
    registry: &AccessorRegistry,
    options: &RenderOptions,
    pool: Option<&RenderPool>,
) -> Result<Vec<XmlOutputToken>, TemplateError> {
    let globals = Environment::new();
    builtins::install(&globals, options);
    for (key, value) in data.iter() {
        globals.define(key, value.clone());
    }

    let names = builtins::NAMES.iter().copied().chain(data.keys());
    let resolution = stencil_parse::resolve(program, names)?;
    debug!(locals = resolution.len(), "resolved program");

    let own_pool = match pool {
        Some(_) => None,
        None => RenderPool::for_options(options),
    };
    let pool = pool
        .filter(|_| options.parallel_loops)
        .or(own_pool.as_ref());
    let interpreter = Interpreter::new(program, &resolution, globals, registry, pool);
    Ok(interpreter.run()?)
}
