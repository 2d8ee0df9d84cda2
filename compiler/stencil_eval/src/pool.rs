//! Worker pool for parallel `for` loops.

use std::fmt;
use std::sync::Arc;

use rayon::ThreadPool;
use tracing::{debug, warn};

use crate::RenderOptions;

/// Handle to a rayon pool, cheap to clone.
///
/// A compiled template builds one pool and hands it to every render, so
/// repeated renders reuse the same worker threads.
#[derive(Clone)]
pub struct RenderPool(Arc<ThreadPool>);

impl RenderPool {
    /// Start `worker_threads` workers; `0` lets rayon pick the count.
    ///
    /// Returns `None` when the pool cannot start, and loops then run
    /// sequentially.
    pub fn new(worker_threads: usize) -> Option<Self> {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|i| format!("stencil-render-{i}"))
            .build()
        {
            Ok(pool) => {
                debug!(threads = pool.current_num_threads(), "started render pool");
                Some(RenderPool(Arc::new(pool)))
            }
            Err(err) => {
                warn!(%err, "could not start render pool, loops run sequentially");
                None
            }
        }
    }

    /// A pool when `options` asks for parallel loops.
    pub fn for_options(options: &RenderOptions) -> Option<Self> {
        if options.parallel_loops {
            Self::new(options.worker_threads)
        } else {
            None
        }
    }

    pub fn threads(&self) -> usize {
        self.0.current_num_threads()
    }

    pub fn ptr_eq(&self, other: &RenderPool) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn as_rayon(&self) -> &ThreadPool {
        &self.0
    }
}

impl fmt::Debug for RenderPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPool")
            .field("threads", &self.threads())
            .finish()
    }
}
