//! Tree-walking interpreter.
//!
//! Statements produce [`XmlOutputToken`]s, expressions produce [`Value`]s.
//! The interpreter is shared by reference across loop workers, so every
//! piece of per-render state is either immutable (`Program`, `Resolution`,
//! registry) or behind a lock.
//!
//! # Scopes
//!
//! Runtime scopes mirror the ones the resolver walked: one child per block,
//! `if` body, loop iteration, `insert`/`rewrite` body and call. References
//! with a recorded hop count use [`Environment::get_at`]; everything else is
//! a global lookup.

mod call;
mod expr;
mod stmt;

use parking_lot::Mutex;
use stencil_ir::{ExprArena, Program, XmlOutputToken};
use stencil_parse::Resolution;
use tracing::debug;

use crate::environment::{Environment, WeakEnvironment};
use crate::pool::RenderPool;
use crate::value::AccessorRegistry;
use crate::EvalError;

pub struct Interpreter<'a> {
    program: &'a Program,
    resolution: &'a Resolution,
    globals: Environment,
    registry: &'a AccessorRegistry,
    /// Present when loop bodies run in parallel.
    pool: Option<&'a RenderPool>,
    /// Scopes captured by closures during this render.
    captured: Mutex<Vec<WeakEnvironment>>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        program: &'a Program,
        resolution: &'a Resolution,
        globals: Environment,
        registry: &'a AccessorRegistry,
        pool: Option<&'a RenderPool>,
    ) -> Self {
        Interpreter {
            program,
            resolution,
            globals,
            registry,
            pool,
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Execute the whole program in the global scope.
    ///
    /// The global scope and every scope a closure captured are emptied
    /// afterwards, on success and on error, so closures stored in their own
    /// scope chain are freed. An interpreter runs once.
    pub fn run(&self) -> Result<Vec<XmlOutputToken>, EvalError> {
        let mut out = Vec::new();
        let result = self.exec_stmts(&self.program.stmts, &self.globals, &mut out);
        self.release_scopes();
        result?;
        debug!(tokens = out.len(), parallel = self.pool.is_some(), "rendered program");
        Ok(out)
    }

    #[inline]
    fn arena(&self) -> &'a ExprArena {
        &self.program.arena
    }

    /// Remember a scope a new closure holds on to.
    fn track_capture(&self, env: &Environment) {
        let mut captured = self.captured.lock();
        if captured.len() == captured.capacity() {
            captured.retain(WeakEnvironment::is_live);
        }
        captured.push(env.downgrade());
    }

    fn release_scopes(&self) {
        let captured = std::mem::take(&mut *self.captured.lock());
        let live: Vec<Environment> = captured
            .iter()
            .filter_map(WeakEnvironment::upgrade)
            .collect();
        debug!(scopes = live.len(), "releasing closure scopes");
        for env in &live {
            env.clear_chain();
        }
        self.globals.clear_chain();
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
