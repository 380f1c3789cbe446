//! Keyed trial: one concrete trial type for many experiment kinds

use super::{ResultType, Trial, TrialRegistry, TrialValue};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Configuration map of a keyed trial.
pub type Configuration = serde_json::Map<String, Value>;

/// A trial identified by a tag plus an arbitrary configuration map.
///
/// Execution and result-type declaration both dispatch on the tag through
/// the shared [`TrialRegistry`]; the configuration shape plays no part in
/// dispatch.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use serde_json::json;
/// use trial_conductor::trial::{KeyedTrial, Trial, TrialRegistry, TrialValue};
///
/// let registry = Arc::new(TrialRegistry::new());
/// registry.register("sum", |t| Ok(t.i64("a")? + t.i64("b")?))?;
///
/// let trial = KeyedTrial::new(&registry, "sum", json!({"a": 2, "b": 3}))?;
/// assert_eq!(trial.conduct()?, TrialValue::Int(5));
/// # Ok::<(), trial_conductor::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct KeyedTrial {
    registry: Arc<TrialRegistry>,
    tag: String,
    configuration: Configuration,
}

impl KeyedTrial {
    /// Create a keyed trial from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `configuration` is not a
    /// JSON object.
    pub fn new(
        registry: &Arc<TrialRegistry>,
        tag: impl Into<String>,
        configuration: Value,
    ) -> Result<Self> {
        match configuration {
            Value::Object(map) => Ok(Self::with_configuration(registry, tag, map)),
            other => Err(Error::InvalidConfiguration {
                key: "<root>".to_string(),
                reason: format!("expected a JSON object, got {other}"),
            }),
        }
    }

    /// Create a keyed trial from an already-built configuration map.
    #[must_use]
    pub fn with_configuration(
        registry: &Arc<TrialRegistry>,
        tag: impl Into<String>,
        configuration: Configuration,
    ) -> Self {
        Self {
            registry: Arc::clone(registry),
            tag: tag.into(),
            configuration,
        }
    }

    /// Dispatch tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Full configuration map.
    #[must_use]
    pub const fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Raw configuration value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.configuration.get(key)
    }

    /// Deserialize the configuration value for `key` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the key is missing or the
    /// value does not deserialize into `T`.
    pub fn param<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.require(key)?;
        serde_json::from_value(value.clone()).map_err(|e| Error::InvalidConfiguration {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Floating point parameter (integers are widened).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if missing or not a number.
    pub fn f64(&self, key: &str) -> Result<f64> {
        self.typed(key, "a number", Value::as_f64)
    }

    /// Unsigned integer parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if missing or not an unsigned integer.
    pub fn u64(&self, key: &str) -> Result<u64> {
        self.typed(key, "an unsigned integer", Value::as_u64)
    }

    /// Signed integer parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if missing or not an integer.
    pub fn i64(&self, key: &str) -> Result<i64> {
        self.typed(key, "an integer", Value::as_i64)
    }

    /// Boolean parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if missing or not a boolean.
    pub fn bool(&self, key: &str) -> Result<bool> {
        self.typed(key, "a boolean", Value::as_bool)
    }

    /// String parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if missing or not a string.
    pub fn str(&self, key: &str) -> Result<&str> {
        self.typed(key, "a string", Value::as_str)
    }

    fn require(&self, key: &str) -> Result<&Value> {
        self.configuration
            .get(key)
            .ok_or_else(|| Error::InvalidConfiguration {
                key: key.to_string(),
                reason: "missing".to_string(),
            })
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: &str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T> {
        let value = self.require(key)?;
        extract(value).ok_or_else(|| Error::InvalidConfiguration {
            key: key.to_string(),
            reason: format!("expected {expected}, got {value}"),
        })
    }
}

impl Trial for KeyedTrial {
    type Output = TrialValue;

    fn conduct(&self) -> Result<TrialValue> {
        self.registry.execute(self)
    }

    fn result_type(&self) -> Result<ResultType> {
        self.registry.result_type(&self.tag).map(ResultType::Keyed)
    }
}
