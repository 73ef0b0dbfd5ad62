//! Scheduling primitives.
//!
//! Each primitive is an owned struct with `&mut self` methods; the ones that
//! repeat implement [`Activity`](crate::Activity) and can be registered with a
//! [`Runner`](crate::Runner) or driven directly.
//!
//! ## Contents
//! - [`Cancellable`] stop predicates ([`NeverTerminate`], [`Countdown`], [`Deadline`], [`TerminateOnCancel`])
//! - [`Triggerable`] armed flags ([`Trigger`], [`AlwaysOn`])
//! - [`Periodic`]          work at a target frequency
//! - [`Looped`]            work on every tick
//! - [`TriggeredSequence`] start/run/stop episodes driven by a trigger
//! - [`TimedEvents`]       offsets that fire once per episode
//! - [`OnOffCycle`]        bounded on/off phases, single use
//!
//! ## Suspension points
//! ```text
//! Periodic  ── sleep(max(interval / 4, MIN_YIELD))   every tick
//! Looped    ── sleep(tick)  (DEFAULT_TICK, >= MIN_YIELD)
//! OnOffCycle── sleep(on_duration()), sleep(off_duration())
//! ```
//! Work that never awaits starves every other activity of the runner.

use std::time::Duration;

use crate::error::ActivityError;
use crate::policies::JitterPolicy;

mod cancellable;
mod looped;
mod on_off;
mod periodic;
mod timed_events;
mod trigger;
mod triggered;

pub use cancellable::{Cancellable, Countdown, Deadline, NeverTerminate, TerminateOnCancel};
pub use looped::Looped;
pub use on_off::{OnOffCycle, OnOffCycleBuilder};
pub use periodic::Periodic;
pub(crate) use periodic::interval_for;
pub use timed_events::TimedEvents;
pub use trigger::{AlwaysOn, Trigger, Triggerable};
pub use triggered::{TriggeredSequence, TriggeredSequenceBuilder};

/// Smallest cooperative sleep any primitive takes.
pub const MIN_YIELD: Duration = Duration::from_millis(1);

/// Default yield of [`Looped`].
pub const DEFAULT_TICK: Duration = Duration::from_millis(1);

/// Synchronous lifecycle callback.
pub type Callback = Box<dyn FnMut() -> Result<(), ActivityError> + Send>;

/// Phase duration, evaluated once per phase.
pub type DurationFn = Box<dyn FnMut() -> Duration + Send>;

/// Phase duration that is always `d`.
pub fn fixed(d: Duration) -> impl FnMut() -> Duration + Send + 'static {
    move || d
}

/// Phase duration of `d` randomized by `jitter` on every evaluation.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use coopvisor::{schedule::jittered, JitterPolicy};
///
/// let mut phase = jittered(Duration::from_millis(100), JitterPolicy::Equal);
/// let d = phase();
/// assert!(d >= Duration::from_millis(50) && d <= Duration::from_millis(100));
/// ```
pub fn jittered(d: Duration, jitter: JitterPolicy) -> impl FnMut() -> Duration + Send + 'static {
    move || jitter.apply(d)
}
