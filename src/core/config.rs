//! # Runner configuration.
//!
//! [`RunnerConfig`] holds the policy flags and timing knobs of a
//! [`Runner`](crate::Runner). It is validated once, when the runner is built.
//!
//! ## Policy flags
//! ```text
//! restart_on_completion ─► CompletionPolicy::{Restart | Remove}
//! restart_on_exception  ─┐
//! cancel_on_exception   ─┴► FailurePolicy::{Restart | CancelRunner | Drop}   (restart wins)
//! ```
//!
//! ## Grace window
//! `grace_for(pending) = max(grace_per_activity * pending, min_grace)`

use std::time::Duration;

use crate::error::ConfigError;
use crate::policies::{BackoffPolicy, CompletionPolicy, FailurePolicy};
use crate::schedule::interval_for;

/// Configuration of a [`Runner`](crate::Runner).
///
/// All fields are public; prefer the helper accessors over re-deriving
/// policies from the flags.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Target invocations per second of the user callback.
    pub callback_frequency: f64,

    /// Cancel the whole runner when an activity fails (unless restarted).
    pub cancel_on_exception: bool,

    /// Restart an activity after it fails. Takes precedence over `cancel_on_exception`.
    pub restart_on_exception: bool,

    /// Restart an activity after it returns `Ok(())`; otherwise it is removed.
    pub restart_on_completion: bool,

    /// Grace budget granted per still-pending activity once the runner is cancelled.
    pub grace_per_activity: Duration,

    /// Lower bound of the grace window.
    pub min_grace: Duration,

    /// Delay before re-running a failed activity.
    pub restart_backoff: BackoffPolicy,

    /// Capacity of the event bus (min 1).
    pub bus_capacity: usize,

    /// Pause before re-running an activity that completed normally.
    pub tick: Duration,
}

impl RunnerConfig {
    /// Checks the frequency, the tick, and that some grace window is granted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        interval_for(self.callback_frequency)?;
        if self.tick.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "tick",
                value: self.tick,
            });
        }
        if self.min_grace.is_zero() && self.grace_per_activity.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "min_grace",
                value: self.min_grace,
            });
        }
        Ok(())
    }

    /// Decision applied when an activity fails.
    #[inline]
    pub fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::from_flags(self.restart_on_exception, self.cancel_on_exception)
    }

    /// Decision applied when an activity completes.
    #[inline]
    pub fn completion_policy(&self) -> CompletionPolicy {
        CompletionPolicy::from_flag(self.restart_on_completion)
    }

    /// Grace window for `pending` activities (saturating).
    pub fn grace_for(&self, pending: usize) -> Duration {
        let n = u32::try_from(pending).unwrap_or(u32::MAX);
        self.grace_per_activity
            .checked_mul(n)
            .unwrap_or(Duration::MAX)
            .max(self.min_grace)
    }
}

impl Default for RunnerConfig {
    /// - `callback_frequency = 10 Hz`
    /// - all policy flags off (completed and failed activities are removed)
    /// - `grace_per_activity = 500ms`, `min_grace = 100ms`
    /// - `restart_backoff` = constant 10ms
    /// - `bus_capacity = 1024`, `tick = 1ms`
    fn default() -> Self {
        Self {
            callback_frequency: 10.0,
            cancel_on_exception: false,
            restart_on_exception: false,
            restart_on_completion: false,
            grace_per_activity: Duration::from_millis(500),
            min_grace: Duration::from_millis(100),
            restart_backoff: BackoffPolicy::default(),
            bus_capacity: 1024,
            tick: Duration::from_millis(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RunnerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.failure_policy(), FailurePolicy::Drop);
        assert_eq!(cfg.completion_policy(), CompletionPolicy::Remove);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = RunnerConfig {
            callback_frequency: 0.0,
            ..RunnerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidFrequency { .. })
        ));

        let cfg = RunnerConfig {
            tick: Duration::ZERO,
            ..RunnerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroDuration { field: "tick", .. })
        ));
    }

    #[test]
    fn validate_requires_some_grace() {
        let cfg = RunnerConfig {
            min_grace: Duration::ZERO,
            grace_per_activity: Duration::ZERO,
            ..RunnerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroDuration { field: "min_grace", .. })
        ));

        let floorless = RunnerConfig {
            min_grace: Duration::ZERO,
            ..RunnerConfig::default()
        };
        assert!(floorless.validate().is_ok());
    }

    #[test]
    fn grace_scales_with_pending_and_has_a_floor() {
        let cfg = RunnerConfig::default();
        assert_eq!(cfg.grace_for(0), Duration::from_millis(100));
        assert_eq!(cfg.grace_for(3), Duration::from_millis(1500));
        assert!(cfg.grace_for(usize::MAX) > Duration::from_secs(1_000_000));

        let cfg = RunnerConfig {
            grace_per_activity: Duration::MAX,
            ..RunnerConfig::default()
        };
        assert_eq!(cfg.grace_for(2), Duration::MAX);
    }
}
