//! Error types for trial-conductor
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trial-conductor error types
///
/// Every variant is fatal for the batch it occurs in: the engine never
/// retries a trial and never returns a partial result collection.
#[derive(Error, Debug)]
pub enum Error {
    /// No implementation registered for a keyed trial tag
    #[error("No trial implementation registered for tag '{0}'\nRegister it with TrialRegistry::register before conducting")]
    UnregisteredTag(String),

    /// A tag was registered twice
    #[error("Trial tag '{0}' is already registered")]
    DuplicateTag(String),

    /// Batch trials declare different result types
    #[error("Batch is not homogeneous: expected result type {expected}, found {found}")]
    MixedResultTypes {
        /// Result type declared by the first trial
        expected: String,
        /// Conflicting result type
        found: String,
    },

    /// Keyed trial configuration is missing a parameter or has the wrong type
    #[error("Invalid configuration for key '{key}': {reason}")]
    InvalidConfiguration {
        /// Configuration key
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// A trial reported its own failure
    #[error("Trial failed: {0}")]
    TrialFailed(String),

    /// A trial panicked on a worker thread
    #[error("Worker panicked while conducting a trial: {0}")]
    WorkerPanicked(String),

    /// Result channel closed before the completion sentinel arrived
    #[error("Result channel closed before the batch completed")]
    ResultChannelClosed,

    /// Dedicated worker pool could not be built
    #[error("Worker pool construction failed: {0}")]
    PoolBuild(String),

    /// Producer or collector task was cancelled by the runtime
    #[error("Batch task cancelled: {0}")]
    TaskCancelled(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            let payload = err.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Self::WorkerPanicked(message)
        } else {
            Self::TaskCancelled(err.to_string())
        }
    }
}
