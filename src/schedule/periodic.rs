//! # Scheduled invocation at a target frequency.
//!
//! [`Periodic`] turns a unit of work into a self-pacing activity:
//!
//! ```text
//! next = now
//! loop {
//!   ├─► cancel.is_cancelled()?  → return Ok
//!   ├─► now >= next?            → work().await?; next += interval
//!   └─► sleep(pause)               (always, even if work did not run)
//! }
//! ```
//!
//! `next` advances by a fixed `interval` rather than being reset from "now":
//! a transient delay is caught up (at most one invocation per tick) instead of
//! permanently shifting the phase. `pause` is a quarter of the interval,
//! floored at [`MIN_YIELD`] so very high frequencies cannot busy-loop.

use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant};

use crate::error::{ActivityError, ConfigError};
use crate::schedule::{Cancellable, MIN_YIELD};
use crate::tasks::Activity;

/// Invokes `work` at `frequency` Hz until `cancel` says stop.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use coopvisor::{ActivityError, Deadline, Periodic};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut blinks = 0u32;
/// let mut blink = Periodic::new(
///     "blink",
///     20.0,
///     Deadline::after(Duration::from_millis(100)),
///     || {
///         blinks += 1;
///         async { Ok::<_, ActivityError>(()) }
///     },
/// )?;
/// blink.drive().await?;
/// # Ok(())
/// # }
/// ```
pub struct Periodic<W, C> {
    name: Cow<'static, str>,
    work: W,
    cancel: C,
    interval: Duration,
    pause: Duration,
}

impl<W, C> Periodic<W, C> {
    /// Creates the wrapper; fails if `frequency` is not finite and positive.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        frequency: f64,
        cancel: C,
        work: W,
    ) -> Result<Self, ConfigError> {
        let interval = interval_for(frequency)?;
        Ok(Self {
            name: name.into(),
            work,
            cancel,
            interval,
            pause: (interval / 4).max(MIN_YIELD),
        })
    }

    /// Time between two scheduled invocations.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Cooperative sleep taken on every tick.
    pub fn pause(&self) -> Duration {
        self.pause
    }

    /// Runs until the stop predicate is true or `work` fails.
    ///
    /// Usable directly for non-`'static` work; the [`Activity`] impl delegates here.
    pub async fn drive<Fut>(&mut self) -> Result<(), ActivityError>
    where
        W: FnMut() -> Fut,
        Fut: Future<Output = Result<(), ActivityError>>,
        C: Cancellable,
    {
        let mut next = Instant::now();
        loop {
            if self.cancel.is_cancelled() {
                return Ok(());
            }
            if Instant::now() >= next {
                (self.work)().await?;
                next += self.interval;
            }
            time::sleep(self.pause).await;
        }
    }
}

/// `1 / frequency` as a duration.
pub(crate) fn interval_for(frequency: f64) -> Result<Duration, ConfigError> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(ConfigError::InvalidFrequency { frequency });
    }
    Duration::try_from_secs_f64(1.0 / frequency)
        .map_err(|_| ConfigError::InvalidFrequency { frequency })
}

#[async_trait]
impl<W, Fut, C> Activity for Periodic<W, C>
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
