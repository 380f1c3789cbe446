//! Tag registry for keyed trials
//!
//! Maps a tag to an `(execute, declared result type)` pair. The declared
//! [`ValueKind`] is derived from the executor's return type at
//! registration, so the two can never disagree.

use super::KeyedTrial;
use crate::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of value a keyed trial produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Boolean outcome
    Bool,
    /// Signed integer
    Int,
    /// Floating point
    Float,
    /// UTF-8 text
    Text,
    /// Arbitrary JSON document
    Json,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Result of a keyed trial.
///
/// Serialized with its [`ValueKind`] alongside the payload, e.g.
/// `{"kind":"bool","value":true}`, so a `Json(true)` reads back as `Json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TrialValue {
    /// Boolean outcome
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Arbitrary JSON document
    Json(serde_json::Value),
}

impl TrialValue {
    /// Kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Json(_) => ValueKind::Json,
        }
    }

    /// Boolean payload, if this is a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if this is an `Int`.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float payload, if this is a `Float`.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Text payload, if this is a `Text`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Rust types a keyed trial executor may return.
pub trait IntoTrialValue {
    /// Kind declared for executors returning this type.
    const KIND: ValueKind;

    /// Wrap into a [`TrialValue`].
    fn into_trial_value(self) -> TrialValue;
}

impl IntoTrialValue for bool {
    const KIND: ValueKind = ValueKind::Bool;
    fn into_trial_value(self) -> TrialValue {
        TrialValue::Bool(self)
    }
}

impl IntoTrialValue for i64 {
    const KIND: ValueKind = ValueKind::Int;
    fn into_trial_value(self) -> TrialValue {
        TrialValue::Int(self)
    }
}

impl IntoTrialValue for i32 {
    const KIND: ValueKind = ValueKind::Int;
    fn into_trial_value(self) -> TrialValue {
        TrialValue::Int(i64::from(self))
    }
}

impl IntoTrialValue for u32 {
    const KIND: ValueKind = ValueKind::Int;
    fn into_trial_value(self) -> TrialValue {
        TrialValue::Int(i64::from(self))
    }
}

impl IntoTrialValue for f64 {
    const KIND: ValueKind = ValueKind::Float;
    fn into_trial_value(self) -> TrialValue {
        TrialValue::Float(self)
    }
}

impl IntoTrialValue for String {
    const KIND: ValueKind = ValueKind::Text;
    fn into_trial_value(self) -> TrialValue {
        TrialValue::Text(self)
    }
}

impl IntoTrialValue for serde_json::Value {
    const KIND: ValueKind = ValueKind::Json;
    fn into_trial_value(self) -> TrialValue {
        TrialValue::Json(self)
    }
}

type Executor = Arc<dyn Fn(&KeyedTrial) -> Result<TrialValue> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    kind: ValueKind,
    execute: Executor,
}

/// Registry of keyed trial implementations.
///
/// Thread-safe: registration and lookup both take `&self`, backed by a
/// `DashMap` keyed with FxHash.
///
/// # Example
///
/// ```rust
/// use trial_conductor::trial::{TrialRegistry, ValueKind};
///
/// let registry = TrialRegistry::new();
/// registry
///     .register("double", |trial| Ok(trial.f64("x")? * 2.0))
///     .unwrap();
///
/// assert_eq!(registry.result_type("double").unwrap(), ValueKind::Float);
/// assert!(registry.result_type("triple").is_err());
/// ```
pub struct TrialRegistry {
    entries: DashMap<String, Registration, FxBuildHasher>,
}

impl TrialRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Register the implementation for `tag`.
    ///
    /// The declared result type is `R::KIND`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTag`] if `tag` is already registered.
    pub fn register<R, F>(&self, tag: impl Into<String>, execute: F) -> Result<()>
    where
        R: IntoTrialValue,
        F: Fn(&KeyedTrial) -> Result<R> + Send + Sync + 'static,
    {
        match self.entries.entry(tag.into()) {
            Entry::Occupied(entry) => Err(Error::DuplicateTag(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Registration {
                    kind: R::KIND,
                    execute: Arc::new(move |trial| execute(trial).map(R::into_trial_value)),
                });
                Ok(())
            }
        }
    }

    /// Declared result kind for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredTag`] for unknown tags.
    pub fn result_type(&self, tag: &str) -> Result<ValueKind> {
        self.entries
            .get(tag)
            .map(|entry| entry.kind)
            .ok_or_else(|| Error::UnregisteredTag(tag.to_string()))
    }

    /// Run the implementation registered for `trial.tag()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnregisteredTag`] for unknown tags, or whatever the
    /// implementation itself returns.
    pub fn execute(&self, trial: &KeyedTrial) -> Result<TrialValue> {
        // Clone the executor out so the shard lock is released while it runs
        let execute = self
            .entries
            .get(trial.tag())
            .map(|entry| Arc::clone(&entry.execute))
            .ok_or_else(|| Error::UnregisteredTag(trial.tag().to_string()))?;
        execute(trial)
    }

    /// Check whether `tag` is registered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no tag is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        tags.sort();
        tags
    }
}

impl Default for TrialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TrialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrialRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
