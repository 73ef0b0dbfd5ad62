//! # Stop predicates for scheduling primitives.
//!
//! Every primitive in [`schedule`](crate::schedule) asks a [`Cancellable`]
//! once per tick whether it should stop. Provided implementations:
//!
//! | Type                  | Stops when                                          |
//! |-----------------------|-----------------------------------------------------|
//! | [`NeverTerminate`]    | never                                               |
//! | [`Countdown`]         | after it has answered "keep going" `n` times        |
//! | [`Deadline`]          | a fixed duration after construction                 |
//! | [`TerminateOnCancel`] | the owning runner's cancel flag is set              |
//!
//! `CancellationToken` and `CancelHandle` implement the trait directly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::CancelHandle;

/// A "should I stop now?" signal.
pub trait Cancellable: Send + Sync {
    /// Returns `true` when the caller should stop.
    fn is_cancelled(&self) -> bool;
}

/// Never asks to stop.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverTerminate;

impl Cancellable for NeverTerminate {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Answers "keep going" `n` times, then "stop" forever.
///
/// Each query consumes one unit, so a loop guarded by `Countdown::new(3)`
/// performs exactly three iterations.
#[derive(Debug)]
pub struct Countdown {
    remaining: AtomicU64,
}

impl Countdown {
    /// Creates a countdown allowing `n` iterations.
    pub fn new(n: u64) -> Self {
        Self {
            remaining: AtomicU64::new(n),
        }
    }

    /// Iterations still allowed.
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Relaxed)
    }
}

impl Cancellable for Countdown {
    fn is_cancelled(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_err()
    }
}

/// Asks to stop once a duration has elapsed since construction.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Stops `duration` from now.
    pub fn after(duration: Duration) -> Self {
        Self {
            at: Instant::now() + duration,
        }
    }

    /// Stops at `at`.
    pub fn at(at: Instant) -> Self {
        Self { at }
    }
}

impl Cancellable for Deadline {
    fn is_cancelled(&self) -> bool {
        Instant::now() >= self.at
    }
}

/// Asks to stop once the runner it was created from is cancelled.
///
/// Obtained from [`Runner::terminate_on_cancel`](crate::Runner::terminate_on_cancel).
/// Follows the runner across runs: after a new `run()` resets the flag, this
/// predicate reports `false` again.
#[derive(Clone, Debug)]
pub struct TerminateOnCancel {
    handle: CancelHandle,
}

impl TerminateOnCancel {
    /// Wraps a runner's cancel handle.
    pub fn new(handle: CancelHandle) -> Self {
        Self { handle }
    }
}

impl Cancellable for TerminateOnCancel {
    fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }
}

impl Cancellable for CancelHandle {
    fn is_cancelled(&self) -> bool {
        CancelHandle::is_cancelled(self)
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

impl<C: Cancellable + ?Sized> Cancellable for std::sync::Arc<C> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_allows_exactly_n() {
        let c = Countdown::new(3);
        let allowed = (0..10).take_while(|_| !c.is_cancelled()).count();
        assert_eq!(allowed, 3);
        assert!(c.is_cancelled());
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn zero_countdown_stops_immediately() {
        assert!(Countdown::new(0).is_cancelled());
    }

    #[test]
    fn never_terminate_is_false() {
        assert!(!NeverTerminate.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expires() {
        let d = Deadline::after(Duration::from_millis(50));
        assert!(!d.is_cancelled());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!d.is_cancelled());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(d.is_cancelled());
    }

    #[test]
    fn terminate_on_cancel_follows_handle() {
        let handle = CancelHandle::new();
        let pred = TerminateOnCancel::new(handle.clone());
        assert!(!pred.is_cancelled());
        handle.cancel();
        assert!(pred.is_cancelled());
        handle.reset();
        assert!(!pred.is_cancelled());
    }
}
