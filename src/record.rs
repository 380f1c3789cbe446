//! Batch Record - bookkeeping for one `conduct` call

use crate::trial::ResultType;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Status of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Batch is created but not yet dispatched.
    Pending,
    /// Trials are executing.
    Running,
    /// Every trial completed and all results were collected.
    Completed,
    /// The batch was aborted; no results were returned.
    Failed,
}

/// Batch Record tracks the lifecycle of one batch execution.
///
/// Lifecycle: `Pending → Running → Completed | Failed`. A batch that
/// fails before dispatch (unregistered tag, mixed result types) goes
/// straight from `Pending` to `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchRecord {
    batch_id: String,
    status: BatchStatus,
    trials: usize,
    workers: usize,
    result_type: Option<String>,
    collected: usize,
    failure: Option<String>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl BatchRecord {
    /// Create a new batch record in Pending status.
    ///
    /// # Arguments
    ///
    /// * `batch_id` - Caller-chosen identifier for the batch
    /// * `trials` - Batch length
    /// * `workers` - Size of the worker pool the batch runs on
    #[must_use]
    pub fn new(batch_id: impl Into<String>, trials: usize, workers: usize) -> Self {
        Self {
            batch_id: batch_id.into(),
            status: BatchStatus::Pending,
            trials,
            workers,
            result_type: None,
            collected: 0,
            failure: None,
            started_at: None,
            ended_at: None,
        }
    }

    /// Get the batch ID.
    #[must_use]
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> BatchStatus {
        self.status
    }

    /// Get the batch length.
    #[must_use]
    pub const fn trials(&self) -> usize {
        self.trials
    }

    /// Get the worker pool size.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Get the declared result type, once known.
    #[must_use]
    pub fn result_type(&self) -> Option<&str> {
        self.result_type.as_deref()
    }

    /// Get the number of results collected.
    #[must_use]
    pub const fn collected(&self) -> usize {
        self.collected
    }

    /// Get the failure message, if the batch failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Get the start timestamp, if the batch was dispatched.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the end timestamp, if the batch has ended.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Wall-clock time between start and end.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        Some(self.ended_at? - self.started_at?)
    }

    /// Record the declared result type of the batch.
    pub fn declare(&mut self, result_type: Option<ResultType>) {
        self.result_type = result_type.map(|t| t.to_string());
    }

    /// Start the batch, transitioning from Pending to Running.
    pub fn start(&mut self) {
        self.status = BatchStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Complete the batch with the number of collected results.
    pub fn complete(&mut self, collected: usize) {
        self.status = BatchStatus::Completed;
        self.collected = collected;
        self.ended_at = Some(Utc::now());
    }

    /// Mark the batch as failed.
    pub fn fail(&mut self, error: &Error) {
        self.status = BatchStatus::Failed;
        self.failure = Some(error.to_string());
        self.ended_at = Some(Utc::now());
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
