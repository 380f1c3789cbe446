//! Engine configuration

use crate::Result;
use serde::{Deserialize, Serialize};

/// Configuration for an [`crate::Engine`].
///
/// Deserializable from JSON; absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dedicated pool size. `None` uses the rayon global pool.
    pub workers: Option<usize>,
    /// Name prefix for dedicated worker threads.
    pub thread_name: String,
    /// Progress log lines per batch (0 disables progress logging).
    pub progress_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            thread_name: "trial-worker".to_string(),
            progress_steps: 20,
        }
    }
}

impl EngineConfig {
    /// Use a dedicated pool with the given number of workers (at least 1).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Use the rayon global pool.
    #[must_use]
    pub fn with_global_pool(mut self) -> Self {
        self.workers = None;
        self
    }

    /// Set the dedicated worker thread name prefix.
    #[must_use]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Set how many progress lines are logged per batch.
    #[must_use]
    pub const fn with_progress_steps(mut self, steps: usize) -> Self {
        self.progress_steps = steps;
        self
    }

    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.workers, None);
        assert_eq!(config.thread_name, "trial-worker");
        assert_eq!(config.progress_steps, 20);
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::default()
            .with_workers(4)
            .with_thread_name("sim")
            .with_progress_steps(0);

        assert_eq!(config.workers, Some(4));
        assert_eq!(config.thread_name, "sim");
        assert_eq!(config.progress_steps, 0);
        assert_eq!(config.with_global_pool().workers, None);
    }

    #[test]
    fn test_minimum_workers() {
        let config = EngineConfig::default().with_workers(0);
        assert_eq!(config.workers, Some(1));
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"workers": 2}"#).unwrap();
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.progress_steps, 20);
    }

    #[test]
    fn test_from_json_malformed() {
        let err = EngineConfig::from_json("{workers:").unwrap_err();
        assert!(err.to_string().contains("JSON error"));
    }
}
