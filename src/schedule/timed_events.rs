//! # Events at fixed offsets from a start instant.
//!
//! [`TimedEvents`] separates *what has elapsed* from *what to do about it*:
//! the caller pulls due tags with [`run`](TimedEvents::run) and dispatches on
//! them, so one clock can sequence lights, sound and display together.
//!
//! ```text
//! add_event(0ms, A) add_event(50ms, B) add_event(50ms, C)
//! start() ──► run()@0ms → [A]   run()@20ms → []   run()@60ms → [B, C]
//!             run()@70ms → []   (remaining empty → stops)
//! ```
//!
//! Each tag fires at most once per episode; `start()` while running keeps the
//! original clock.

use std::time::Duration;

use tokio::time::Instant;

use crate::schedule::Triggerable;

/// Ordered `(offset, tag)` list replayed once per episode.
#[derive(Clone, Debug)]
pub struct TimedEvents<T> {
    events: Vec<(Duration, T)>,
    remaining: Vec<(Duration, T)>,
    started_at: Option<Instant>,
}

impl<T> Default for TimedEvents<T> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            remaining: Vec::new(),
            started_at: None,
        }
    }
}

impl<T: Clone> TimedEvents<T> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event; takes effect from the next `start()`.
    pub fn add_event(&mut self, offset: Duration, tag: T) -> &mut Self {
        self.events.push((offset, tag));
        self
    }

    /// Starts an episode now. No-op while running.
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Starts an episode at `now`. No-op while running.
    pub fn start_at(&mut self, now: Instant) {
        if self.started_at.is_some() {
            return;
        }
        self.started_at = Some(now);
        self.remaining = self.events.clone();
    }

    /// Starts an episode if `trigger` is armed, consuming the edge.
    ///
    /// Returns `true` if a new episode was started.
    pub fn start_on(&mut self, trigger: &impl Triggerable) -> bool {
        if !trigger.is_triggered() {
            return false;
        }
        trigger.set_triggered(false);
        if self.is_running() {
            return false;
        }
        self.start();
        true
    }

    /// Returns the tags that became due since the last call.
    pub fn run(&mut self) -> Vec<T> {
        self.run_at(Instant::now())
    }

    /// Same as [`run`](Self::run) with an explicit clock reading.
    pub fn run_at(&mut self, now: Instant) -> Vec<T> {
        let Some(started_at) = self.started_at else {
            return Vec::new();
        };
        if self.remaining.is_empty() {
            self.stop();
            return Vec::new();
        }

        let elapsed = now.saturating_duration_since(started_at);
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.remaining)
            .into_iter()
            .partition(|(offset, _)| elapsed >= *offset);
        self.remaining = pending;
        due.into_iter().map(|(_, tag)| tag).collect()
    }

    /// Ends the episode and discards unfired events. Idempotent.
    pub fn stop(&mut self) {
        self.started_at = None;
        self.remaining.clear();
    }

    /// Alias of [`stop`](Self::stop).
    pub fn reset(&mut self) {
        self.stop();
    }

    /// True between `start()` and `stop()`/exhaustion.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Number of events not yet fired in this episode.
    pub fn pending(&self) -> usize {
        self.remaining.len()
    }

    /// Number of registered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if no events are registered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
