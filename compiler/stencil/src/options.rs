//! Compile and render settings.

use stencil_eval::{NumberSymbols, RenderOptions};
use stencil_lexer::Delimiters;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateOptions {
    pub delimiters: Delimiters,
    /// Render `for` iterations on a worker pool.
    pub parallel_loops: bool,
    /// `0` means one worker per core.
    pub worker_threads: usize,
    pub number_symbols: NumberSymbols,
    /// Run the structural repair pass after rendering.
    pub repair: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        TemplateOptions {
            delimiters: Delimiters::default(),
            parallel_loops: false,
            worker_threads: 0,
            number_symbols: NumberSymbols::default(),
            repair: true,
        }
    }
}

impl TemplateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiters(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.delimiters = Delimiters::new(open, close);
        self
    }

    #[must_use]
    pub fn with_parallel_loops(mut self, enabled: bool) -> Self {
        self.parallel_loops = enabled;
        self
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    #[must_use]
    pub fn with_number_symbols(mut self, symbols: NumberSymbols) -> Self {
        self.number_symbols = symbols;
        self
    }

    #[must_use]
    pub fn with_repair(mut self, enabled: bool) -> Self {
        self.repair = enabled;
        self
    }

    pub(crate) fn render_options(&self) -> RenderOptions {
        RenderOptions {
            parallel_loops: self.parallel_loops,
            worker_threads: self.worker_threads,
            number_symbols: self.number_symbols,
            line_breaks: None,
        }
    }
}
