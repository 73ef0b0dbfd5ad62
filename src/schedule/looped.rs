//! # Tight repeat loop.
//!
//! [`Looped`] repeats `check → yield → work` until its stop predicate is true.
//! It is what device controllers use for "poll this every tick", and what
//! [`TriggeredSequence`](crate::TriggeredSequence) is driven by.
//!
//! The yield is a `tick`-long sleep ([`DEFAULT_TICK`] unless changed), never a
//! zero-length yield, so a loop cannot monopolize the executor.

use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

use crate::error::ActivityError;
use crate::schedule::{Cancellable, DEFAULT_TICK, MIN_YIELD};
use crate::tasks::Activity;

/// Invokes `work` once per tick until `cancel` says stop.
pub struct Looped<W, C> {
    name: Cow<'static, str>,
    work: W,
    cancel: C,
    tick: Duration,
}

impl<W, C> Looped<W, C> {
    /// Creates a loop with the default tick.
    pub fn new(name: impl Into<Cow<'static, str>>, cancel: C, work: W) -> Self {
        Self {
            name: name.into(),
            work,
            cancel,
            tick: DEFAULT_TICK,
        }
    }

    /// Sets the yield between iterations (floored at [`MIN_YIELD`]).
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(MIN_YIELD);
        self
    }

    /// Current yield between iterations.
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Runs until the stop predicate is true or `work` fails.
    pub async fn drive<Fut>(&mut self) -> Result<(), ActivityError>
    where
        W: FnMut() -> Fut,
        Fut: Future<Output = Result<(), ActivityError>>,
        C: Cancellable,
    {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            time::sleep(self.tick).await;
            (self.work)().await?;
        }
    }
}

#[async_trait]
impl<W, Fut, C> Activity for Looped<W, C>
where
    W: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), ActivityError>> + Send + 'static,
    C: Cancellable + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&mut self) -> Result<(), ActivityError> {
        self.drive().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Countdown;
    use futures::future::{ready, Ready};

    #[tokio::test(start_paused = true)]
    async fn runs_once_per_allowed_iteration() {
        let mut calls = 0u32;
        let start = time::Instant::now();
        let mut l = Looped::new("poll", Countdown::new(5), || {
            calls += 1;
            ready(Ok::<_, ActivityError>(()))
        })
        .with_tick(Duration::from_millis(10));
        l.drive().await.unwrap();
        drop(l);

        assert_eq!(calls, 5);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_stops_the_loop() {
        let mut calls = 0u32;
        let mut l = Looped::new("button", Countdown::new(100), || -> Ready<Result<(), ActivityError>> {
            calls += 1;
            if calls == 2 {
                ready(Err(ActivityError::fail("debounce glitch")))
            } else {
                ready(Ok(()))
            }
        });
        let err = l.drive().await.unwrap_err();
        drop(l);

        assert_eq!(calls, 2);
        assert_eq!(err.as_label(), "activity_failed");
    }

    #[test]
    fn tick_is_floored() {
        let l = Looped::new("x", Countdown::new(0), || ready(Ok::<_, ActivityError>(())))
            .with_tick(Duration::ZERO);
        assert_eq!(l.tick(), MIN_YIELD);
    }
}
