//! # Jitter for computed durations.
//!
//! [`JitterPolicy`] randomizes a base duration. It is used by the restart
//! [`BackoffPolicy`](crate::BackoffPolicy) and by [`jittered`](crate::schedule::jittered)
//! phase durations of an [`OnOffCycle`](crate::OnOffCycle) (flicker, twinkle, ...).
//!
//! - [`JitterPolicy::None`]: exact duration
//! - [`JitterPolicy::Full`]: random in `[0, d]`
//! - [`JitterPolicy::Equal`]: `d/2 + random[0, d/2]`
//! - [`JitterPolicy::Spread`]: random in `[d/2, 3d/2]`, mean stays at `d`

use rand::Rng;
use std::time::Duration;

/// Randomization applied to a base duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// Use the duration unchanged.
    #[default]
    None,

    /// Random duration in `[0, d]`.
    Full,

    /// `d/2 + random[0, d/2]`; never shorter than half the base.
    Equal,

    /// Random duration in `[d/2, 3d/2]`.
    ///
    /// Keeps the average at `d`, which is what blinking/flicker effects want.
    Spread,
}

impl JitterPolicy {
    /// Applies the jitter to `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        let us = delay.as_micros().min(u128::from(u64::MAX)) as u64;
        if us == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::rng();
        let half = us / 2;
        let jittered = match self {
            JitterPolicy::None => us,
            JitterPolicy::Full => rng.random_range(0..=us),
            JitterPolicy::Equal => half + rng.random_range(0..=half),
            JitterPolicy::Spread => rng.random_range(half..=us.saturating_add(half)),
        };
        Duration::from_micros(jittered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let d = Duration::from_millis(250);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn zero_stays_zero() {
        for p in [JitterPolicy::Full, JitterPolicy::Equal, JitterPolicy::Spread] {
            assert_eq!(p.apply(Duration::ZERO), Duration::ZERO);
        }
    }

    #[test]
    fn bounds_hold() {
        let d = Duration::from_millis(100);
        for _ in 0..500 {
            assert!(JitterPolicy::Full.apply(d) <= d);

            let eq = JitterPolicy::Equal.apply(d);
            assert!(eq >= d / 2 && eq <= d, "equal jitter out of range: {eq:?}");

            let sp = JitterPolicy::Spread.apply(d);
            assert!(
                sp >= d / 2 && sp <= d * 3 / 2,
                "spread jitter out of range: {sp:?}"
            );
        }
    }
}
