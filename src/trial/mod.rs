//! Trial capability
//!
//! A trial is one independent unit of work that produces exactly one
//! result of a declared type. Two flavors exist:
//!
//! - **Specialized trials**: any type implementing [`Trial`] directly,
//!   one type per experiment kind.
//! - **Keyed trials**: [`KeyedTrial`] carries a tag plus a configuration
//!   map and dispatches through a [`TrialRegistry`], so many experiment
//!   kinds share one concrete type.
//!
//! ## Example
//!
//! ```rust
//! use trial_conductor::trial::{ResultType, Trial};
//!
//! struct Square(u64);
//!
//! impl Trial for Square {
//!     type Output = u64;
//!
//!     fn conduct(&self) -> trial_conductor::Result<u64> {
//!         Ok(self.0 * self.0)
//!     }
//! }
//!
//! assert_eq!(Square(7).conduct().unwrap(), 49);
//! assert_eq!(Square(7).result_type().unwrap(), ResultType::of::<u64>());
//! ```

mod keyed;
mod registry;

pub use keyed::{Configuration, KeyedTrial};
pub use registry::{IntoTrialValue, TrialRegistry, TrialValue, ValueKind};

use crate::Result;
use std::fmt;

/// Declared result type of a trial, known before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    /// Statically typed output of a specialized trial (Rust type name)
    Native(&'static str),
    /// Dynamically typed output of a keyed trial
    Keyed(ValueKind),
}

impl ResultType {
    /// Result type of a statically typed output `R`.
    #[must_use]
    pub fn of<R>() -> Self {
        Self::Native(std::any::type_name::<R>())
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(name) => f.write_str(name),
            Self::Keyed(kind) => write!(f, "keyed {kind}"),
        }
    }
}

/// Capability of being a runnable unit of work.
///
/// There is no blanket or default implementation of [`Trial::conduct`]:
/// a type that does not implement this trait cannot be submitted to the
/// engine at all.
pub trait Trial: Send {
    /// Value produced by one execution.
    type Output: Send + 'static;

    /// Execute the trial once.
    ///
    /// May have arbitrary side effects (sampling randomness, IO). The
    /// engine runs many trials concurrently and imposes no isolation
    /// between them.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole batch the trial belongs to.
    fn conduct(&self) -> Result<Self::Output>;

    /// Declare the result type ahead of execution.
    ///
    /// Specialized trials use the default, derived from [`Trial::Output`].
    ///
    /// # Errors
    ///
    /// Keyed trials return [`crate::Error::UnregisteredTag`] when their tag
    /// has no registered implementation.
    fn result_type(&self) -> Result<ResultType> {
        Ok(ResultType::of::<Self::Output>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(i32);

    impl Trial for Constant {
        type Output = i32;

        fn conduct(&self) -> Result<i32> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_specialized_trial_conduct() {
        assert_eq!(Constant(5).conduct().unwrap(), 5);
    }

    #[test]
    fn test_default_result_type_is_output_type() {
        let declared = Constant(1).result_type().unwrap();
        assert_eq!(declared, ResultType::of::<i32>());
        assert_ne!(declared, ResultType::of::<i64>());
    }

    #[test]
    fn test_result_type_display() {
        assert_eq!(ResultType::of::<bool>().to_string(), "bool");
        assert_eq!(ResultType::Keyed(ValueKind::Float).to_string(), "keyed float");
    }
}
