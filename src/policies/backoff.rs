//! # Delay before restarting a failed activity.
//!
//! When the runner restarts an activity after a failure
//! (`restart_on_exception`), it waits `first × factor^n` (clamped to `max`,
//! then jittered) where `n` is the number of consecutive failures so far.
//! A successful completion resets `n`.
//!
//! The base is derived from `n` alone, so jitter never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use coopvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(10),
//!     max: Duration::from_millis(500),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(10));
//! assert_eq!(backoff.next(3), Duration::from_millis(80));
//! assert_eq!(backoff.next(20), Duration::from_millis(500));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Restart delay policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first restart.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Growth factor per consecutive failure (`1.0` = constant).
    pub factor: f64,
    /// Randomization applied after clamping.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Constant 10ms delay, capped at 1s, no jitter.
    ///
    /// Small enough that a restarting sensor loop is back almost immediately,
    /// large enough that a permanently failing activity cannot spin the executor.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(10),
            max: Duration::from_secs(1),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay after `failures` consecutive failures (0-indexed).
    pub fn next(&self, failures: u32) -> Duration {
        let exp = failures.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(first_ms: u64, max_ms: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max: Duration::from_millis(max_ms),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn default_is_constant() {
        let p = BackoffPolicy::default();
        for n in 0..8 {
            assert_eq!(p.next(n), Duration::from_millis(10), "failure #{n}");
        }
    }

    #[test]
    fn grows_then_clamps() {
        let p = policy(100, 1_000, 2.0);
        assert_eq!(p.next(0), Duration::from_millis(100));
        assert_eq!(p.next(1), Duration::from_millis(200));
        assert_eq!(p.next(2), Duration::from_millis(400));
        assert_eq!(p.next(3), Duration::from_millis(800));
        assert_eq!(p.next(4), Duration::from_millis(1_000));
        assert_eq!(p.next(u32::MAX), Duration::from_millis(1_000));
    }

    #[test]
    fn first_above_max_is_clamped() {
        let p = policy(5_000, 1_000, 1.0);
        assert_eq!(p.next(0), Duration::from_millis(1_000));
    }

    #[test]
    fn jitter_never_exceeds_base() {
        let p = BackoffPolicy {
            jitter: JitterPolicy::Full,
            ..policy(100, 10_000, 2.0)
        };
        for n in 0..6 {
            let base = Duration::from_millis(100 * 2u64.pow(n));
            assert!(p.next(n) <= base, "failure #{n}");
        }
    }
}
