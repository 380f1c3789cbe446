//! # trial-conductor: Parallel Trial Batches with Streamed Results
//!
//! **Version**: 0.1.0
//!
//! trial-conductor executes a large batch of independent trials across a
//! pool of worker threads, streams each result back to a single collector
//! as soon as it is ready, and reports progress while the result
//! collection is assembled.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Heijunka**: Bounded result channel sized to the batch
//! - **Poka-Yoke safety**: Specialized trials are checked at compile time;
//!   keyed trial tags and result types are checked before any dispatch
//! - **Jidoka**: The first failing trial stops the whole batch
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use trial_conductor::trial::{KeyedTrial, TrialRegistry};
//! use trial_conductor::{Engine, EngineConfig};
//!
//! let registry = Arc::new(TrialRegistry::new());
//! registry.register("parity", |t| Ok(t.u64("n")? % 2 == 0))?;
//!
//! let batch = (0..100)
//!     .map(|n| KeyedTrial::new(&registry, "parity", json!({ "n": n })))
//!     .collect::<trial_conductor::Result<Vec<_>>>()?;
//!
//! let engine = Engine::new(EngineConfig::default().with_workers(4))?;
//! let results = engine.conduct_blocking(batch)?;
//!
//! assert_eq!(results.len(), 100);
//! assert_eq!(results.iter().filter(|v| v.as_bool() == Some(true)).count(), 50);
//! # Ok::<(), trial_conductor::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod channel;
pub mod engine;
pub mod error;
pub mod progress;
pub mod record;
pub mod trial;

pub use engine::{Engine, EngineConfig, WorkerPool};
pub use error::{Error, Result};
pub use progress::{ProgressSink, SilentProgress, TracingProgress};
pub use record::{BatchRecord, BatchStatus};
pub use trial::{KeyedTrial, ResultType, Trial, TrialRegistry, TrialValue};

/// Conduct `batch` on the rayon global pool with default settings.
///
/// # Errors
///
/// See [`Engine::conduct`].
pub async fn conduct<T>(batch: Vec<T>) -> Result<Vec<T::Output>>
where
    T: Trial + 'static,
{
    Engine::default().conduct(batch).await
}
