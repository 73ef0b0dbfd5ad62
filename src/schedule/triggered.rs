//! # Triggered start/run/stop episodes.
//!
//! A [`TriggeredSequence`] watches a [`Triggerable`] and, when it is armed,
//! runs one *episode* lasting `duration`:
//!
//! ```text
//! every tick (now):
//!   1. armed && !running  → stop_time = now + duration; running = true; on_start()
//!   2. clear the trigger     (edge consumed, even when ignored)
//!   3. running && now >= stop_time → running = false; on_stop()
//!   4. still running      → on_run()
//! ```
//!
//! While an episode runs, new trigger edges are consumed and ignored, so two
//! episodes never overlap. An `on_stop` that re-arms the trigger starts the
//! next episode on the following tick.
//!
//! The tick body is [`step`](TriggeredSequence::step); [`into_activity`](TriggeredSequence::into_activity)
//! wraps it in a [`Looped`] activity. A sequence force-terminated mid-episode
//! does not get its `on_stop` call.

use std::borrow::Cow;
use std::time::Duration;

use futures::future::{ready, Ready};
use tokio::time::Instant;

use crate::error::{ActivityError, ConfigError};
use crate::schedule::{Callback, Cancellable, Looped, Triggerable};

/// Start/run/stop lifecycle driven by a trigger.
pub struct TriggeredSequence<T> {
    name: Cow<'static, str>,
    trigger: T,
    duration: Duration,
    on_start: Option<Callback>,
    on_run: Option<Callback>,
    on_stop: Option<Callback>,
    running: bool,
    stop_time: Instant,
}

impl<T: Triggerable> TriggeredSequence<T> {
    /// Starts building a sequence for `trigger` with episodes of `duration`.
    pub fn builder(
        name: impl Into<Cow<'static, str>>,
        trigger: T,
        duration: Duration,
    ) -> TriggeredSequenceBuilder<T> {
        TriggeredSequenceBuilder {
            name: name.into(),
            trigger,
            duration,
            on_start: None,
            on_run: None,
            on_stop: None,
        }
    }

    /// True while an episode is in progress.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Episode length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One tick of the sequence at time `now`.
    ///
    /// The trigger is cleared even if `on_start` fails.
    pub fn step(&mut self, now: Instant) -> Result<(), ActivityError> {
        let mut started = Ok(());
        if self.trigger.is_triggered() && !self.running {
            self.stop_time = now + self.duration;
            self.running = true;
            started = invoke(&mut self.on_start);
        }
        self.trigger.set_triggered(false);
        started?;

        if self.running && now >= self.stop_time {
            self.running = false;
            invoke(&mut self.on_stop)?;
        }

        if self.running {
            invoke(&mut self.on_run)?;
        }
        Ok(())
    }
}

impl<T: Triggerable + 'static> TriggeredSequence<T> {
    /// Wraps the sequence in a [`Looped`] activity that steps it every tick.
    pub fn into_activity<C: Cancellable>(
        mut self,
        cancel: C,
    ) -> Looped<impl FnMut() -> Ready<Result<(), ActivityError>> + Send + 'static, C> {
        let name = self.name.clone();
        Looped::new(name, cancel, move || ready(self.step(Instant::now())))
    }
}

fn invoke(cb: &mut Option<Callback>) -> Result<(), ActivityError> {
    match cb {
        Some(f) => f(),
        None => Ok(()),
    }
}

/// Builder for [`TriggeredSequence`]; at least one callback is required.
pub struct TriggeredSequenceBuilder<T> {
    name: Cow<'static, str>,
    trigger: T,
    duration: Duration,
    on_start: Option<Callback>,
    on_run: Option<Callback>,
    on_stop: Option<Callback>,
}

impl<T: Triggerable> TriggeredSequenceBuilder<T> {
    /// Called once when an episode starts.
    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<(), ActivityError> + Send + 'static,
    {
        self.on_start = Some(Box::new(f));
        self
    }

    /// Called on every tick while the episode runs.
    pub fn on_run<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<(), ActivityError> + Send + 'static,
    {
        self.on_run = Some(Box::new(f));
        self
    }

    /// Called once when the episode's duration has elapsed.
    pub fn on_stop<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<(), ActivityError> + Send + 'static,
    {
        self.on_stop = Some(Box::new(f));
        self
    }

    /// Builds the sequence.
    pub fn build(self) -> Result<TriggeredSequence<T>, ConfigError> {
        if self.on_start.is_none() && self.on_run.is_none() && self.on_stop.is_none() {
            return Err(ConfigError::NoCallbacks {
                primitive: "TriggeredSequence",
                expected: "on_start, on_run, on_stop",
            });
        }
        Ok(TriggeredSequence {
            name: self.name,
            trigger: self.trigger,
            duration: self.duration,
            on_start: self.on_start,
            on_run: self.on_run,
            on_stop: self.on_stop,
            running: false,
            stop_time: Instant::now(),
        })
    }
}
