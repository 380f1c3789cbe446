//! Parallel batch engine
//!
//! `conduct(batch)` runs two concurrent tasks joined structurally:
//!
//! ```text
//!  Producer (blocking thread)            Collector (async task)
//!  ──────────────────────────            ──────────────────────
//!  fan trials out to WorkerPool           loop {
//!    worker: conduct(trial)                 Result(r) → push r, advance
//!            push Result(r) ──► channel ──► Done      → stop
//!  join all workers                       }
//!  push Done
//! ```
//!
//! Results arrive in completion order, not batch order. The first trial
//! failure (error or panic) aborts the batch and no results are returned.
//!
//! Toyota Way: Jidoka (stop the line on the first defect)

mod config;
mod pool;

pub use config::EngineConfig;
pub use pool::WorkerPool;

use crate::channel::{Delivery, ResultChannel, ResultReceiver, ResultSender};
use crate::progress::{ProgressSink, TracingProgress};
use crate::record::BatchRecord;
use crate::trial::{ResultType, Trial};
use crate::{Error, Result};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Executes batches of trials across a worker pool.
///
/// # Example
///
/// ```rust
/// use trial_conductor::{Engine, EngineConfig, Trial};
///
/// struct Square(u64);
///
/// impl Trial for Square {
///     type Output = u64;
///     fn conduct(&self) -> trial_conductor::Result<u64> {
///         Ok(self.0 * self.0)
///     }
/// }
///
/// let engine = Engine::new(EngineConfig::default().with_workers(2))?;
/// let mut squares = engine.conduct_blocking((1..=4).map(Square).collect())?;
/// squares.sort_unstable();
/// assert_eq!(squares, vec![1, 4, 9, 16]);
/// # Ok::<(), trial_conductor::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pool: WorkerPool,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PoolBuild`] if a dedicated pool was requested and
    /// could not be built.
    pub fn new(mut config: EngineConfig) -> Result<Self> {
        // Deserialized configs bypass `with_workers`, so clamp here too
        config.workers = config.workers.map(|workers| workers.max(1));
        let pool = match config.workers {
            Some(workers) => WorkerPool::build(workers, &config.thread_name)?,
            None => WorkerPool::Global,
        };
        Ok(Self { pool, config })
    }

    /// Create an engine over an environment-provided pool.
    #[must_use]
    pub fn with_pool(pool: Arc<rayon::ThreadPool>) -> Self {
        let config = EngineConfig {
            workers: Some(pool.current_num_threads()),
            ..EngineConfig::default()
        };
        Self {
            pool: WorkerPool::Dedicated(pool),
            config,
        }
    }

    /// Number of workers trials are fanned out to.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.size()
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Conduct every trial of `batch` once and collect the results.
    ///
    /// Progress is logged per [`EngineConfig::progress_steps`].
    ///
    /// # Errors
    ///
    /// - [`Error::UnregisteredTag`] / [`Error::MixedResultTypes`] before
    ///   any trial runs
    /// - the first error returned by a trial
    /// - [`Error::WorkerPanicked`] if a trial panics
    pub async fn conduct<T>(&self, batch: Vec<T>) -> Result<Vec<T::Output>>
    where
        T: Trial + 'static,
    {
        self.conduct_with(batch, TracingProgress::new(self.config.progress_steps))
            .await
    }

    /// Like [`Engine::conduct`], reporting progress to `progress`.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::conduct`].
    pub async fn conduct_with<T, P>(&self, batch: Vec<T>, progress: P) -> Result<Vec<T::Output>>
    where
        T: Trial + 'static,
        P: ProgressSink + 'static,
    {
        let declared = declared_result_type(&batch).map_err(|e| {
            warn!(error = %e, "batch rejected before dispatch");
            e
        })?;
        self.run(batch, progress, declared).await
    }

    /// Like [`Engine::conduct`], also returning a [`BatchRecord`].
    ///
    /// The record is returned on failure too, with status `Failed`.
    pub async fn conduct_recorded<T>(
        &self,
        batch_id: impl Into<String>,
        batch: Vec<T>,
    ) -> (Result<Vec<T::Output>>, BatchRecord)
    where
        T: Trial + 'static,
    {
        let mut record = BatchRecord::new(batch_id, batch.len(), self.workers());
        let declared = match declared_result_type(&batch) {
            Ok(declared) => declared,
            Err(e) => {
                warn!(batch_id = record.batch_id(), error = %e, "batch rejected before dispatch");
                record.fail(&e);
                return (Err(e), record);
            }
        };
        record.declare(declared);
        record.start();

        let progress = TracingProgress::new(self.config.progress_steps);
        let outcome = self.run(batch, progress, declared).await;
        match &outcome {
            Ok(results) => record.complete(results.len()),
            Err(e) => record.fail(e),
        }
        (outcome, record)
    }

    /// Blocking wrapper around [`Engine::conduct`] on a fresh
    /// current-thread runtime.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::conduct`], plus [`Error::Io`] if the runtime
    /// cannot be built.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async runtime.
    pub fn conduct_blocking<T>(&self, batch: Vec<T>) -> Result<Vec<T::Output>>
    where
        T: Trial + 'static,
    {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(self.conduct(batch))
    }

    async fn run<T, P>(
        &self,
        batch: Vec<T>,
        progress: P,
        declared: Option<ResultType>,
    ) -> Result<Vec<T::Output>>
    where
        T: Trial + 'static,
        P: ProgressSink + 'static,
    {
        let started = Instant::now();
        let total = batch.len();
        let result_type = declared.map_or_else(|| "-".to_string(), |t| t.to_string());
        info!(
            trials = total,
            workers = self.workers(),
            result_type = %result_type,
            "conducting batch"
        );

        let (sender, receiver) = ResultChannel::for_batch(total).split();
        let pool = self.pool.clone();
        // The collector lives inside this future: dropping it drops the
        // receiver, so the next push fails and workers stop taking trials.
        let producer = tokio::task::spawn_blocking(move || produce(&pool, batch, sender));
        let (produced, collected) = tokio::join!(producer, collect(receiver, progress, total));

        let outcome = settle(produced.map_err(Error::from).and_then(|r| r), collected);
        match &outcome {
            Ok(results) => debug!(
                collected = results.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "batch complete"
            ),
            Err(e) => warn!(error = %e, "batch aborted"),
        }
        outcome
    }
}

/// Result type shared by every trial of the batch, `None` for an empty batch.
fn declared_result_type<T: Trial>(batch: &[T]) -> Result<Option<ResultType>> {
    let mut declared: Option<ResultType> = None;
    for trial in batch {
        let found = trial.result_type()?;
        match declared {
            None => declared = Some(found),
            Some(expected) if expected != found => {
                return Err(Error::MixedResultTypes {
                    expected: expected.to_string(),
                    found: found.to_string(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(declared)
}

/// Producer: fan out, join every worker, then push the single sentinel.
fn produce<T: Trial>(
    pool: &WorkerPool,
    batch: Vec<T>,
    sender: ResultSender<T::Output>,
) -> Result<()> {
    if !batch.is_empty() {
        pool.install(|| {
            batch
                .into_par_iter()
                .try_for_each(|trial| sender.push(trial.conduct()?))
        })?;
    }
    sender.finish()
}

/// Collector: drain until the sentinel, advancing progress per result.
async fn collect<R, P>(
    mut receiver: ResultReceiver<R>,
    mut progress: P,
    total: usize,
) -> Result<Vec<R>>
where
    R: Send,
    P: ProgressSink,
{
    let mut results = Vec::with_capacity(total);
    if total > 0 {
        progress.start(total);
    }
    while let Delivery::Result(result) = receiver.next().await? {
        results.push(result);
        progress.advance();
    }
    debug_assert_eq!(results.len(), total);
    if total > 0 {
        progress.finish();
    }
    Ok(results)
}

/// The producer's failure explains a closed channel, so it wins over the
/// collector's, unless the collector itself died first.
fn settle<R>(produced: Result<()>, collected: Result<Vec<R>>) -> Result<Vec<R>> {
    match (produced, collected) {
        (Ok(()), collected) => collected,
        (Err(Error::ResultChannelClosed), Err(collector_err)) => Err(collector_err),
        (Err(producer_err), _) => Err(producer_err),
    }
}
