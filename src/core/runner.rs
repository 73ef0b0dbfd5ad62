//! # Runner: the cooperative task supervisor.
//!
//! A [`Runner`] owns a set of registered activities. [`Runner::run`] drives all
//! of them, plus the user callback, from a single future: no task is spawned,
//! so it works the same on a `current_thread` runtime.
//!
//! ## One run
//! ```text
//! run(callback)
//!   ├─► AlreadyRunning?  → Err (fail fast)
//!   ├─► cancel flag reset; registered activities taken
//!   ├─► poll loop (biased, one tick per wake-up):
//!   │     1. callback scheduler   Periodic(callback_frequency, until cancelled)
//!   │     2. supervising handlers FuturesUnordered<supervise(activity)>
//!   │     3. cancel token
//!   │     no handlers left → cancel ("no activities left")
//!   ├─► CancelRequested
//!   ├─► callback scheduler dropped
//!   ├─► drain: timeout(grace_for(pending), handlers)
//!   │     ├─ all stopped → AllStoppedWithinGrace
//!   │     └─ timeout     → GraceExceeded, stragglers Terminated and dropped
//!   ├─► re-register survivors (stopped by cancellation), then late additions
//!   └─► RunFinished → Ok(RunReport)
//! ```
//!
//! ## Failure semantics
//! - Activity failures follow [`RunnerConfig::failure_policy`].
//! - A failing or panicking callback always cancels the run; it is never restarted.
//! - Teardown problems are logged and reported in [`RunReport`], never returned.

use std::future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::ready;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::broadcast;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::builder::RunnerBuilder;
use crate::core::emitter::Emitter;
use crate::core::handler::{supervise, HandlerCtx, HandlerExit};
use crate::core::table::{ActivityState, ActivityTable};
use crate::core::{CancelHandle, RunnerConfig};
use crate::error::{ActivityError, ConfigError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::schedule::{Periodic, TerminateOnCancel};
use crate::subscribers::SubscriberSet;
use crate::tasks::{Activity, ActivityRef};

/// Outcome of one [`Runner::run`].
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Activities registered when the run started.
    pub registered: usize,
    /// Final state of each of them, in registration order.
    pub states: Vec<(String, ActivityState)>,
    /// Activities dropped after the grace window; their cleanup did not run.
    pub force_terminated: Vec<String>,
    /// True if the drain did not finish inside the grace window.
    pub grace_exceeded: bool,
    /// Why the run was cancelled.
    pub cancel_reason: String,
}

impl RunReport {
    /// Final state of the first activity called `name`.
    pub fn state_of(&self, name: &str) -> Option<ActivityState> {
        self.states
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }
}

/// Cooperative supervisor of repeating activities.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use coopvisor::{ActivityError, Periodic, Runner, RunnerConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let runner = Runner::new(RunnerConfig::default())?;
///
/// let mut polls = 0u64;
/// runner.add(Periodic::new("sensor", 50.0, runner.terminate_on_cancel(), move || {
///     polls += 1;
///     async { Ok::<_, ActivityError>(()) }
/// })?);
///
/// let started = tokio::time::Instant::now();
/// let report = runner
///     .run(|cancel| {
///         if started.elapsed() >= Duration::from_millis(200) {
///             cancel.cancel();
///         }
///         Ok(())
///     })
///     .await?;
///
/// assert!(!report.grace_exceeded);
/// # Ok(())
/// # }
/// ```
pub struct Runner {
    cfg: RunnerConfig,
    activities: Mutex<Vec<ActivityRef>>,
    cancel: CancelHandle,
    running: AtomicBool,
    emitter: Emitter,
}

/// Clears the running flag when `run()` returns or is dropped.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Runner {
    /// Creates a runner with the default [`LogWriter`](crate::LogWriter) subscriber.
    pub fn new(cfg: RunnerConfig) -> Result<Self, ConfigError> {
        RunnerBuilder::new(cfg).build()
    }

    /// Starts a [`RunnerBuilder`] for custom subscribers.
    pub fn builder(cfg: RunnerConfig) -> RunnerBuilder {
        RunnerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: RunnerConfig, subs: SubscriberSet) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        Self {
            emitter: Emitter::new(bus, subs),
            cfg,
            activities: Mutex::new(Vec::new()),
            cancel: CancelHandle::new(),
            running: AtomicBool::new(false),
        }
    }

    /// Configuration this runner was built with.
    pub fn config(&self) -> &RunnerConfig {
        &self.cfg
    }

    /// Registers an activity for the next `run()`.
    ///
    /// Adding while a run is active is allowed but logged: the activity only
    /// joins the following run.
    pub fn add<A: Activity>(&self, activity: A) {
        if self.is_running() {
            tracing::warn!(
                activity = activity.name(),
                "activity added during a run; it joins the next run"
            );
        }
        self.lock_activities().push(Box::new(activity));
    }

    /// Number of activities registered for the next run.
    pub fn len(&self) -> usize {
        self.lock_activities().len()
    }

    /// True if no activity is registered for the next run.
    pub fn is_empty(&self) -> bool {
        self.lock_activities().is_empty()
    }

    /// Sets the cancel flag of the current run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the current (or last) run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Handle to the cancel flag, valid across runs.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Stop predicate for primitives owned by this runner's activities.
    pub fn terminate_on_cancel(&self) -> TerminateOnCancel {
        TerminateOnCancel::new(self.cancel.clone())
    }

    /// True while `run()` is executing.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Receiver for runtime events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.emitter.subscribe()
    }

    /// Runs every registered activity until the runner is cancelled.
    ///
    /// `callback` is invoked at `callback_frequency` with the runner's cancel
    /// handle; it is the usual place to decide when to stop. An error or panic
    /// from the callback cancels the run.
    ///
    /// Returns [`RuntimeError::AlreadyRunning`] if another `run()` is active.
    ///
    /// # Cancel safety
    /// Not cancel safe. The registered activities are moved into the run when
    /// it is first polled and re-registered only when it returns. Dropping the
    /// future early (an outer `timeout` or `select!`) discards them; stop a run
    /// through its [`CancelHandle`] instead.
    pub async fn run<F>(&self, mut callback: F) -> Result<RunReport, RuntimeError>
    where
        F: FnMut(&CancelHandle) -> Result<(), ActivityError>,
    {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        let token = self.cancel.reset();
        let handle = self.cancel.clone();
        let mut scheduler = Periodic::new(
            "runner-callback",
            self.cfg.callback_frequency,
            token.clone(),
            || {
                ready(
                    catch_unwind(AssertUnwindSafe(|| callback(&handle)))
                        .unwrap_or_else(|payload| Err(ActivityError::from_panic(payload))),
                )
            },
        )?;

        let activities = std::mem::take(&mut *self.lock_activities());
        let registered = activities.len();
        let table = Arc::new(ActivityTable::new(
            activities.iter().map(|a| a.name().to_owned()),
        ));
        self.emitter
            .emit(Event::new(EventKind::RunStarted).with_count(registered));

        let mut handlers: FuturesUnordered<_> = activities
            .into_iter()
            .enumerate()
            .map(|(id, activity)| supervise(activity, self.handler_ctx(id, &token, &table)))
            .collect();

        let mut callback_run = Box::pin(scheduler.drive());
        let mut callback_live = true;

        let mut reason: Option<String> = None;
        let mut survivors: Vec<(usize, ActivityRef)> = Vec::new();

        loop {
            tokio::select! {
                biased;
                res = &mut callback_run, if callback_live => {
                    callback_live = false;
                    if let Err(e) = res {
                        self.emitter.emit(
                            Event::new(EventKind::CallbackFailed).with_reason(e.to_string()),
                        );
                        reason.get_or_insert_with(|| format!("callback failed: {e}"));
                        token.cancel();
                    }
                }
                Some((id, exit)) = handlers.next(), if !handlers.is_empty() => {
                    if let Some(why) = settle(&table, id, exit, &mut survivors) {
                        reason.get_or_insert(why);
                    }
                }
                _ = token.cancelled() => {}
                _ = future::ready(()), if handlers.is_empty() => {}
            }

            if handlers.is_empty() && !token.is_cancelled() {
                reason.get_or_insert_with(|| "no activities left".to_string());
                token.cancel();
            }
            if token.is_cancelled() {
                break;
            }
        }

        let cancel_reason = reason.unwrap_or_else(|| "cancel requested".to_string());
        self.emitter.emit(
            Event::new(EventKind::CancelRequested).with_reason(cancel_reason.as_str()),
        );

        // The scheduler is idle between invocations: dropped, never drained.
        drop(callback_run);

        let grace = self.cfg.grace_for(handlers.len());
        let drained = time::timeout(grace, async {
            while let Some((id, exit)) = handlers.next().await {
                settle(&table, id, exit, &mut survivors);
            }
        })
        .await;

        let mut force_terminated = Vec::new();
        let grace_exceeded = drained.is_err();
        if grace_exceeded {
            let stragglers = table.unsettled();
            self.emitter.emit(
                Event::new(EventKind::GraceExceeded)
                    .with_count(stragglers.len())
                    .with_delay(grace),
            );
            for id in stragglers {
                let name = table.name(id);
                table.set(id, ActivityState::Terminated);
                table.settle(id);
                self.emitter
                    .emit(Event::new(EventKind::ActivityTerminated).with_activity(name.clone()));
                force_terminated.push(name.to_string());
            }
        } else {
            self.emitter
                .emit(Event::new(EventKind::AllStoppedWithinGrace));
        }
        drop(handlers);

        survivors.sort_by_key(|(id, _)| *id);
        {
            let mut slots = self.lock_activities();
            let late = std::mem::take(&mut *slots);
            slots.extend(survivors.into_iter().map(|(_, activity)| activity));
            slots.extend(late);
        }

        self.emitter.emit(
            Event::new(EventKind::RunFinished).with_count(force_terminated.len()),
        );
        Ok(RunReport {
            registered,
            states: table.snapshot(),
            force_terminated,
            grace_exceeded,
            cancel_reason,
        })
    }

    fn handler_ctx(
        &self,
        id: usize,
        token: &CancellationToken,
        table: &Arc<ActivityTable>,
    ) -> HandlerCtx {
        HandlerCtx {
            id,
            token: token.clone(),
            table: Arc::clone(table),
            emitter: self.emitter.clone(),
            completion: self.cfg.completion_policy(),
            failure: self.cfg.failure_policy(),
            backoff: self.cfg.restart_backoff,
            tick: self.cfg.tick,
        }
    }

    fn lock_activities(&self) -> MutexGuard<'_, Vec<ActivityRef>> {
        self.activities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Records a handler exit; returns a cancel reason if the activity escalated.
fn settle(
    table: &ActivityTable,
    id: usize,
    exit: HandlerExit,
    survivors: &mut Vec<(usize, ActivityRef)>,
) -> Option<String> {
    table.settle(id);
    match exit {
        HandlerExit::Cancelled(activity) => {
            survivors.push((id, activity));
            None
        }
        HandlerExit::Escalated(activity) => {
            survivors.push((id, activity));
            Some(format!("activity '{}' failed", table.name(id)))
        }
        HandlerExit::Removed => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::ActivityFn;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;
    use tokio::time::Instant;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn quiet(cfg: RunnerConfig) -> Runner {
        Runner::builder(cfg).without_logging().build().unwrap()
    }

    fn fast() -> RunnerConfig {
        RunnerConfig {
            callback_frequency: 100.0,
            ..RunnerConfig::default()
        }
    }

    /// Callback that cancels once `after` has elapsed.
    fn stop_after(after: Duration) -> impl FnMut(&CancelHandle) -> Result<(), ActivityError> {
        let started = Instant::now();
        move |cancel: &CancelHandle| {
            if started.elapsed() >= after {
                cancel.cancel();
            }
            Ok(())
        }
    }

    fn always_failing(name: &'static str, calls: &Arc<AtomicU32>) -> impl Activity {
        let calls = calls.clone();
        ActivityFn::new(name, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ActivityError::fail("sensor read glitch")) }
        })
    }

    fn sleeper(name: &'static str, d: Duration, calls: &Arc<AtomicU32>) -> impl Activity {
        let calls = calls.clone();
        ActivityFn::new(name, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                time::sleep(d).await;
                Ok::<_, ActivityError>(())
            }
        })
    }

    fn cooperative(runner: &Runner, name: &'static str, ticks: &Arc<AtomicU32>) -> impl Activity {
        let ticks = ticks.clone();
        Periodic::new(name, 100.0, runner.terminate_on_cancel(), move || {
            ticks.fetch_add(1, Ordering::SeqCst);
            ready(Ok::<_, ActivityError>(()))
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn escalated_failure_stops_the_runner_promptly() {
        let runner = quiet(RunnerConfig {
            cancel_on_exception: true,
            ..fast()
        });
        let calls = Arc::new(AtomicU32::new(0));
        runner.add(always_failing("flaky", &calls));

        let mut callbacks = 0u32;
        let start = Instant::now();
        let report = runner
            .run(|_| {
                callbacks += 1;
                Ok(())
            })
            .await
            .unwrap();

        assert!(callbacks >= 1);
        assert!(runner.is_cancelled());
        assert!(start.elapsed() < runner.config().grace_for(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.cancel_reason, "activity 'flaky' failed");
        assert_eq!(report.state_of("flaky"), Some(ActivityState::Failed));
        assert!(!report.grace_exceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_callback_does_not_count_against_grace() {
        let runner = quiet(RunnerConfig {
            callback_frequency: 1.0,
            cancel_on_exception: true,
            ..RunnerConfig::default()
        });
        let calls = Arc::new(AtomicU32::new(0));
        runner.add(always_failing("flaky", &calls));
        let mut events = runner.subscribe();

        let start = Instant::now();
        let report = runner.run(|_| Ok(())).await.unwrap();

        assert!(start.elapsed() < runner.config().min_grace);
        assert!(!report.grace_exceeded);
        assert!(report.force_terminated.is_empty());
        let seen: Vec<EventKind> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert!(seen.contains(&EventKind::AllStoppedWithinGrace));
        assert!(!seen.contains(&EventKind::GraceExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_run_fails_fast() {
        let runner = quiet(RunnerConfig {
            restart_on_completion: true,
            ..fast()
        });
        let calls = Arc::new(AtomicU32::new(0));
        runner.add(sleeper("idle", ms(10), &calls));

        let second = async {
            time::sleep(ms(5)).await;
            assert!(runner.is_running());
            runner.run(|_| Ok(())).await
        };
        let (first, second) = tokio::join!(runner.run(stop_after(ms(100))), second);

        assert!(first.is_ok());
        assert!(matches!(second, Err(RuntimeError::AlreadyRunning)));
        assert!(!runner.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_on_exception_keeps_retrying_with_backoff() {
        let runner = quiet(RunnerConfig {
            restart_on_exception: true,
            cancel_on_exception: true,
            ..fast()
        });
        let calls = Arc::new(AtomicU32::new(0));
        runner.add(always_failing("flaky", &calls));

        let report = runner.run(stop_after(ms(100))).await.unwrap();

        let n = calls.load(Ordering::SeqCst);
        assert!((5..=12).contains(&n), "{n} invocations");
        assert_eq!(report.cancel_reason, "cancel requested");
        assert_eq!(report.state_of("flaky"), Some(ActivityState::Cancelled));
        assert_eq!(runner.len(), 1, "cancelled activity stays registered");
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_failure_leaves_the_others_running() {
        let runner = quiet(fast());
        let failures = Arc::new(AtomicU32::new(0));
        let ticks = Arc::new(AtomicU32::new(0));
        runner.add(always_failing("flaky", &failures));
        runner.add(cooperative(&runner, "steady", &ticks));

        let report = runner.run(stop_after(ms(100))).await.unwrap();

        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert!(ticks.load(Ordering::SeqCst) >= 9);
        assert_eq!(report.state_of("flaky"), Some(ActivityState::Removed));
        assert_eq!(report.state_of("steady"), Some(ActivityState::Cancelled));
        assert_eq!(runner.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_failure_is_fatal() {
        let runner = quiet(fast());
        let ticks = Arc::new(AtomicU32::new(0));
        runner.add(cooperative(&runner, "steady", &ticks));
        let mut events = runner.subscribe();

        let mut calls = 0u32;
        let report = runner
            .run(|_| {
                calls += 1;
                if calls == 3 {
                    return Err(ActivityError::fail("display bus error"));
                }
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(calls, 3);
        assert!(report.cancel_reason.starts_with("callback failed"));
        let seen: Vec<EventKind> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert!(seen.contains(&EventKind::CallbackFailed));
        assert_eq!(seen.last(), Some(&EventKind::RunFinished));
    }

    #[tokio::test(start_paused = true)]
    async fn callback_panic_is_fatal() {
        let runner = quiet(fast());
        let ticks = Arc::new(AtomicU32::new(0));
        runner.add(cooperative(&runner, "steady", &ticks));

        let report = runner
            .run(|_| -> Result<(), ActivityError> { panic!("ui gone") })
            .await
            .unwrap();

        assert!(report.cancel_reason.contains("ui gone"));
        assert_eq!(runner.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stragglers_are_terminated_after_grace() {
        let runner = quiet(fast());
        let calls = Arc::new(AtomicU32::new(0));
        runner.add(sleeper("stuck", Duration::from_secs(3600), &calls));
        let mut events = runner.subscribe();

        let start = Instant::now();
        let report = runner.run(stop_after(ms(10))).await.unwrap();

        let grace = runner.config().grace_for(1);
        assert!(start.elapsed() >= grace);
        assert!(start.elapsed() < grace + ms(100));
        assert!(report.grace_exceeded);
        assert_eq!(report.force_terminated, vec!["stuck".to_string()]);
        assert_eq!(report.state_of("stuck"), Some(ActivityState::Terminated));
        assert!(runner.is_empty(), "terminated activities are dropped");

        let seen: Vec<EventKind> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert!(seen.contains(&EventKind::GraceExceeded));
        assert!(seen.contains(&EventKind::ActivityTerminated));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_on_completion_reinvokes() {
        let runner = quiet(RunnerConfig {
            restart_on_completion: true,
            ..fast()
        });
        let calls = Arc::new(AtomicU32::new(0));
        runner.add(sleeper("blink", ms(10), &calls));

        runner.run(stop_after(ms(100))).await.unwrap();

        let n = calls.load(Ordering::SeqCst);
        assert!((7..=11).contains(&n), "{n} invocations");
    }

    #[tokio::test(start_paused = true)]
    async fn completion_without_restart_ends_the_run() {
        let runner = quiet(fast());
        let calls = Arc::new(AtomicU32::new(0));
        runner.add(sleeper("once", ms(10), &calls));

        let report = runner.run(|_| Ok(())).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.cancel_reason, "no activities left");
        assert!(runner.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn survivors_and_late_additions_run_next_time() {
        let runner = quiet(fast());
        let ticks = Arc::new(AtomicU32::new(0));
        let late = Arc::new(AtomicU32::new(0));
        runner.add(cooperative(&runner, "steady", &ticks));

        let mut added = false;
        let started = Instant::now();
        let report = runner
            .run(|cancel| {
                if !added {
                    runner.add(cooperative(&runner, "late", &late));
                    added = true;
                }
                if started.elapsed() >= ms(50) {
                    cancel.cancel();
                }
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(report.registered, 1);
        assert_eq!(late.load(Ordering::SeqCst), 0);
        assert_eq!(runner.len(), 2);

        let first = ticks.load(Ordering::SeqCst);
        let report = runner.run(stop_after(ms(50))).await.unwrap();
        assert_eq!(report.registered, 2);
        assert_eq!(report.states[0].0, "steady");
        assert!(ticks.load(Ordering::SeqCst) > first);
        assert!(late.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_runner_returns_promptly() {
        let runner = quiet(RunnerConfig::default());
        let mut calls = 0u32;

        let report = runner
            .run(|_| {
                calls += 1;
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(report.registered, 0);
        assert_eq!(report.cancel_reason, "no activities left");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_run_future_discards_its_activities() {
        let runner = quiet(fast());
        let ticks = Arc::new(AtomicU32::new(0));
        runner.add(cooperative(&runner, "steady", &ticks));

        let outcome = time::timeout(ms(50), runner.run(|_| Ok(()))).await;

        assert!(outcome.is_err());
        assert!(ticks.load(Ordering::SeqCst) > 0);
        assert!(!runner.is_running());
        assert!(runner.is_empty());

        let report = runner.run(|_| Ok(())).await.unwrap();
        assert_eq!(report.registered, 0);
        assert_eq!(report.cancel_reason, "no activities left");
    }

    #[test]
    fn invalid_config_is_rejected_at_build() {
        let err = Runner::new(RunnerConfig {
            callback_frequency: -1.0,
            ..RunnerConfig::default()
        })
        .err();
        assert!(matches!(err, Some(ConfigError::InvalidFrequency { .. })));
    }
}
