//! # Single-use on/off cycle.
//!
//! ```text
//! for i in 0..cycles:  on()  sleep(on_duration())  off()  sleep(off_duration())
//! finish()
//! ```
//!
//! Durations are evaluated fresh for every phase, so [`jittered`](crate::schedule::jittered)
//! or stateful closures give variable timing. The cycle fires at most once per
//! instance: driving it again after the first run does nothing.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

use crate::error::{ActivityError, ConfigError};
use crate::schedule::{Callback, DurationFn};
use crate::tasks::Activity;

/// Bounded alternation of on and off phases followed by `finish`.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use coopvisor::{schedule::fixed, OnOffCycle};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut beep = OnOffCycle::builder("beep", 2)
///     .on_duration(fixed(Duration::from_millis(5)))
///     .off_duration(fixed(Duration::from_millis(5)))
///     .on(|| Ok(()))
///     .build()?;
/// beep.drive().await?;
/// assert!(beep.is_spent());
/// # Ok(())
/// # }
/// ```
pub struct OnOffCycle {
    name: Cow<'static, str>,
    cycles: u32,
    on_duration: DurationFn,
    off_duration: DurationFn,
    on: Option<Callback>,
    off: Option<Callback>,
    finish: Option<Callback>,
    spent: bool,
}

impl OnOffCycle {
    /// Starts building a cycle repeating `cycles` times.
    pub fn builder(name: impl Into<Cow<'static, str>>, cycles: u32) -> OnOffCycleBuilder {
        OnOffCycleBuilder {
            name: name.into(),
            cycles,
            on_duration: None,
            off_duration: None,
            on: None,
            off: None,
            finish: None,
        }
    }

    /// True once the cycle has been driven.
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Number of on/off pairs.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Runs every phase and `finish`; does nothing on later calls.
    ///
    /// A failing callback aborts the remaining phases, and the instance stays spent.
    pub async fn drive(&mut self) -> Result<(), ActivityError> {
        if self.spent {
            return Ok(());
        }
        self.spent = true;

        for _ in 0..self.cycles {
            invoke(&mut self.on)?;
            time::sleep((self.on_duration)()).await;
            invoke(&mut self.off)?;
            time::sleep((self.off_duration)()).await;
        }
        invoke(&mut self.finish)
    }
}

fn invoke(cb: &mut Option<Callback>) -> Result<(), ActivityError> {
    cb.as_mut().map_or(Ok(()), |f| f())
}

#[async_trait]
impl Activity for OnOffCycle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&mut self) -> Result<(), ActivityError> {
        self.drive().await
    }
}

/// Builder for [`OnOffCycle`].
pub struct OnOffCycleBuilder {
    name: Cow<'static, str>,
    cycles: u32,
    on_duration: Option<DurationFn>,
    off_duration: Option<DurationFn>,
    on: Option<Callback>,
    off: Option<Callback>,
    finish: Option<Callback>,
}

impl OnOffCycleBuilder {
    /// Length of each on phase (required).
    pub fn on_duration<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Duration + Send + 'static,
    {
        self.on_duration = Some(Box::new(f));
        self
    }

    /// Length of each off phase (required).
    pub fn off_duration<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Duration + Send + 'static,
    {
        self.off_duration = Some(Box::new(f));
        self
    }

    /// Called at the start of each on phase.
    pub fn on<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<(), ActivityError> + Send + 'static,
    {
        self.on = Some(Box::new(f));
        self
    }

    /// Called at the start of each off phase.
    pub fn off<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<(), ActivityError> + Send + 'static,
    {
        self.off = Some(Box::new(f));
        self
    }

    /// Called once after the last off phase.
    pub fn finish<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> Result<(), ActivityError> + Send + 'static,
    {
        self.finish = Some(Box::new(f));
        self
    }

    /// Validates and builds the cycle.
    pub fn build(self) -> Result<OnOffCycle, ConfigError> {
        if self.cycles < 1 {
            return Err(ConfigError::InvalidCycles {
                cycles: self.cycles,
            });
        }
        let on_duration = self.on_duration.ok_or(ConfigError::MissingDuration {
            primitive: "OnOffCycle",
            phase: "on",
        })?;
        let off_duration = self.off_duration.ok_or(ConfigError::MissingDuration {
            primitive: "OnOffCycle",
            phase: "off",
        })?;
        if self.on.is_none() && self.off.is_none() && self.finish.is_none() {
            return Err(ConfigError::NoCallbacks {
                primitive: "OnOffCycle",
                expected: "on, off, finish",
            });
        }
        Ok(OnOffCycle {
            name: self.name,
            cycles: self.cycles,
            on_duration,
            off_duration,
            on: self.on,
            off: self.off,
            finish: self.finish,
            spent: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::fixed;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        On,
        Off,
        Finish,
    }

    type Log = Arc<Mutex<Vec<Phase>>>;

    fn recording(cycles: u32, log: &Log) -> OnOffCycle {
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        OnOffCycle::builder("buzz", cycles)
            .on_duration(fixed(Duration::from_millis(10)))
            .off_duration(fixed(Duration::from_millis(20)))
            .on(move || {
                a.lock().unwrap().push(Phase::On);
                Ok(())
            })
            .off(move || {
                b.lock().unwrap().push(Phase::Off);
                Ok(())
            })
            .finish(move || {
                c.lock().unwrap().push(Phase::Finish);
                Ok(())
            })
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn three_cycles_then_finish_once() {
        let log = Log::default();
        let mut cycle = recording(3, &log);
        let start = time::Instant::now();

        cycle.run().await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(90) && elapsed < Duration::from_millis(100));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Phase::On,
                Phase::Off,
                Phase::On,
                Phase::Off,
                Phase::On,
                Phase::Off,
                Phase::Finish
            ]
        );

        cycle.run().await.unwrap();
        assert_eq!(log.lock().unwrap().len(), 7, "second run is a no-op");
        assert!(cycle.is_spent());
    }

    #[tokio::test(start_paused = true)]
    async fn durations_are_evaluated_per_phase() {
        let mut on_ms = 0u64;
        let evaluated = Arc::new(Mutex::new(Vec::new()));
        let seen = evaluated.clone();
        let mut cycle = OnOffCycle::builder("ramp", 3)
            .on_duration(move || {
                on_ms += 5;
                seen.lock().unwrap().push(on_ms);
                Duration::from_millis(on_ms)
            })
            .off_duration(fixed(Duration::ZERO))
            .finish(|| Ok(()))
            .build()
            .unwrap();

        let start = time::Instant::now();
        cycle.drive().await.unwrap();
        assert_eq!(*evaluated.lock().unwrap(), vec![5, 10, 15]);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(30) && elapsed < Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_phase_aborts_and_spends() {
        let finished = Arc::new(Mutex::new(false));
        let f = finished.clone();
        let mut cycle = OnOffCycle::builder("broken", 2)
            .on_duration(fixed(Duration::from_millis(1)))
            .off_duration(fixed(Duration::from_millis(1)))
            .off(|| Err(ActivityError::fail("pwm fault")))
            .finish(move || {
                *f.lock().unwrap() = true;
                Ok(())
            })
            .build()
            .unwrap();

        assert!(cycle.drive().await.is_err());
        assert!(!*finished.lock().unwrap());
        assert!(cycle.drive().await.is_ok());
    }

    #[test]
    fn construction_errors() {
        let err = OnOffCycle::builder("zero", 0)
            .on_duration(fixed(Duration::from_millis(1)))
            .off_duration(fixed(Duration::from_millis(1)))
            .on(|| Ok(()))
            .build()
            .err();
        assert_eq!(err, Some(ConfigError::InvalidCycles { cycles: 0 }));

        let err = OnOffCycle::builder("no-off", 1)
            .on_duration(fixed(Duration::from_millis(1)))
            .on(|| Ok(()))
            .build()
            .err();
        assert_eq!(
            err,
            Some(ConfigError::MissingDuration {
                primitive: "OnOffCycle",
                phase: "off"
            })
        );

        let err = OnOffCycle::builder("silent", 1)
            .on_duration(fixed(Duration::from_millis(1)))
            .off_duration(fixed(Duration::from_millis(1)))
            .build()
            .err();
        assert!(matches!(err, Some(ConfigError::NoCallbacks { .. })));
    }
}
