//! Worker pool the producer fans trials out to

use crate::{Error, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Pool of worker threads.
///
/// The engine only queries its size and installs work into it; it never
/// reconfigures a pool it was handed.
#[derive(Debug, Clone, Default)]
pub enum WorkerPool {
    /// Ambient rayon global pool
    #[default]
    Global,
    /// Pool owned by the caller or built from [`crate::EngineConfig`]
    Dedicated(Arc<ThreadPool>),
}

impl WorkerPool {
    /// Build a dedicated pool of `max(workers, 1)` named threads.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolBuild`] if rayon cannot spawn the threads.
    pub fn build(workers: usize, thread_name: &str) -> Result<Self> {
        let prefix = thread_name.to_string();
        ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map(|pool| Self::Dedicated(Arc::new(pool)))
            .map_err(|e| Error::PoolBuild(e.to_string()))
    }

    /// Number of workers.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Global => rayon::current_num_threads(),
            Self::Dedicated(pool) => pool.current_num_threads(),
        }
    }

    /// Run `op` so that rayon parallel iterators inside it use this pool.
    ///
    /// Blocks the calling thread until `op` returns.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match self {
            Self::Global => op(),
            Self::Dedicated(pool) => pool.install(op),
        }
    }
}
