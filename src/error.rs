//! Error types used by the runner, the scheduling primitives and activities.
//!
//! Three enums cover the whole crate:
//!
//! - [`ConfigError`]: invalid construction parameters, surfaced at call time.
//! - [`RuntimeError`]: errors returned by [`Runner::run`](crate::Runner::run) itself.
//! - [`ActivityError`]: failures of a single activity invocation (or of the user callback).
//!
//! All of them provide `as_label` for logs.

use std::time::Duration;
use thiserror::Error;

/// # Invalid configuration detected while building a primitive or the runner.
///
/// These are never deferred: constructors return them immediately.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invocation frequency must be finite and strictly positive.
    #[error("invalid frequency {frequency}: must be finite and > 0")]
    InvalidFrequency {
        /// The rejected frequency (invocations per second).
        frequency: f64,
    },

    /// None of the optional callbacks was supplied.
    #[error("{primitive}: at least one of {expected} must be provided")]
    NoCallbacks {
        /// Primitive being constructed.
        primitive: &'static str,
        /// Human-readable list of accepted callbacks.
        expected: &'static str,
    },

    /// Cycle count must be at least 1.
    #[error("invalid cycle count {cycles}: must be >= 1")]
    InvalidCycles {
        /// The rejected cycle count.
        cycles: u32,
    },

    /// A required phase duration function was not supplied.
    #[error("{primitive}: missing {phase} duration")]
    MissingDuration {
        /// Primitive being constructed.
        primitive: &'static str,
        /// Phase name (`on` / `off`).
        phase: &'static str,
    },

    /// A yield interval or grace window is zero where a positive duration is required.
    #[error("{field} must be > 0 (got {value:?})")]
    ZeroDuration {
        /// Configuration field name.
        field: &'static str,
        /// The rejected value.
        value: Duration,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use coopvisor::ConfigError;
    ///
    /// let err = ConfigError::InvalidCycles { cycles: 0 };
    /// assert_eq!(err.as_label(), "config_invalid_cycles");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidFrequency { .. } => "config_invalid_frequency",
            ConfigError::NoCallbacks { .. } => "config_no_callbacks",
            ConfigError::InvalidCycles { .. } => "config_invalid_cycles",
            ConfigError::MissingDuration { .. } => "config_missing_duration",
            ConfigError::ZeroDuration { .. } => "config_zero_duration",
        }
    }
}

/// # Errors returned by [`Runner::run`](crate::Runner::run).
///
/// Teardown problems (grace exceeded, force-terminated activities) are not errors:
/// they are logged and reported in [`RunReport`](crate::RunReport).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `run()` was called while another `run()` on the same runner is still active.
    #[error("runner is already running")]
    AlreadyRunning,

    /// The runner configuration is invalid.
    #[error("invalid runner configuration: {0}")]
    Config(#[from] ConfigError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use coopvisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::AlreadyRunning.as_label(), "runtime_already_running");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::AlreadyRunning => "runtime_already_running",
            RuntimeError::Config(_) => "runtime_invalid_config",
        }
    }
}

/// # Failure of a single activity invocation.
///
/// The runner decides what happens next (restart, drop, or cancel everything);
/// the scheduling primitives only propagate these.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum ActivityError {
    /// The invocation returned an error.
    #[error("activity failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The invocation panicked; the panic was caught by the runner.
    #[error("activity panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },
}

impl ActivityError {
    /// Shorthand for [`ActivityError::Fail`].
    ///
    /// # Example
    /// ```
    /// use coopvisor::ActivityError;
    ///
    /// let err = ActivityError::fail("sensor read glitch");
    /// assert_eq!(err.to_string(), "activity failed: sensor read glitch");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        ActivityError::Fail {
            error: error.into(),
        }
    }

    /// Builds a [`ActivityError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let info = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        ActivityError::Panicked { info }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActivityError::Fail { .. } => "activity_failed",
            ActivityError::Panicked { .. } => "activity_panicked",
        }
    }
}
