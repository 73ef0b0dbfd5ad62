//! # coopvisor
//!
//! **Coopvisor** is a cooperative task supervisor for small interactive devices
//! (buttons, buzzers, pixel strips, sensors, tiny HTTP nodes).
//!
//! Many independent, long-running, periodically polled activities share one
//! execution context. A [`Runner`] drives them all from a single future,
//! applies a restart/remove/cancel policy to each one, invokes a user callback
//! at a fixed frequency, and drains everything within a bounded grace window
//! when cancelled. The [`schedule`] primitives turn plain work into such
//! activities.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────┐  ┌──────────────────┐  ┌────────────┐  ┌────────────┐
//!   │ Periodic   │  │ TriggeredSequence│  │ OnOffCycle │  │ ActivityFn │
//!   │ (sensor)   │  │ (button→buzzer)  │  │ (beep x3)  │  │ (server)   │
//!   └─────┬──────┘  └────────┬─────────┘  └─────┬──────┘  └─────┬──────┘
//!         ▼                  ▼                  ▼               ▼
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  Runner::run(callback)          (one future, biased poll loop)     │
//! │  1. callback scheduler   Periodic(callback_frequency)              │
//! │  2. supervising handlers FuturesUnordered<supervise(activity)>     │
//! │  3. cancel token         CancelHandle (level-triggered flag)       │
//! └──────┬───────────────────────────────────────────────┬─────────────┘
//!        │ Event                                         │ cancelled
//!        ▼                                               ▼
//! ┌──────────────────────────────┐        ┌────────────────────────────────┐
//! │ SubscriberSet (sync fan-out) │        │ drain: timeout(grace, handlers)│
//! │  └─ LogWriter → tracing      │        │  └─ stragglers force-terminated│
//! │ Bus (broadcast receivers)    │        └────────────────────────────────┘
//! └──────────────────────────────┘
//! ```
//!
//! ### Per-activity lifecycle
//! ```text
//! Pending → Running → Completed ─┬─ restart_on_completion → Running (after one tick)
//!                   │            └─ otherwise             → Removed
//!                   └ Failed ────┬─ restart_on_exception  → Running (after backoff)
//!                                ├─ cancel_on_exception   → runner cancelled
//!                                └─ otherwise             → Removed
//! runner cancelled → Cancelled (kept for the next run) | Terminated (after grace)
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                                  |
//! |-------------------|-------------------------------------------------------------|-----------------------------------------------------|
//! | **Supervision**   | Run activities with restart/cancel policy and bounded drain | [`Runner`], [`RunnerConfig`], [`RunReport`]         |
//! | **Scheduling**    | Frequency, loop, triggered and timed primitives             | [`Periodic`], [`Looped`], [`TriggeredSequence`], [`TimedEvents`], [`OnOffCycle`] |
//! | **Capabilities**  | Stop predicates and trigger flags                           | [`Cancellable`], [`Triggerable`]                    |
//! | **Policies**      | Restart decisions, backoff, jitter                          | [`FailurePolicy`], [`BackoffPolicy`], [`JitterPolicy`] |
//! | **Observability** | Lifecycle events, subscribers, `tracing` output             | [`Event`], [`Subscribe`], [`LogWriter`]             |
//! | **Errors**        | Typed construction, runtime and activity errors             | [`ConfigError`], [`RuntimeError`], [`ActivityError`] |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use coopvisor::{ActivityError, Periodic, Runner, RunnerConfig, Trigger, TriggeredSequence};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = RunnerConfig {
//!         restart_on_exception: true,
//!         ..RunnerConfig::default()
//!     };
//!     let runner = Runner::new(cfg)?;
//!
//!     // A "button" that fires every 100ms...
//!     let button = Trigger::new();
//!     let press = button.clone();
//!     runner.add(Periodic::new("button", 10.0, runner.terminate_on_cancel(), move || {
//!         press.fire();
//!         async { Ok::<_, ActivityError>(()) }
//!     })?);
//!
//!     // ...and a buzzer that beeps for 30ms per press, never overlapping.
//!     let buzzer = TriggeredSequence::builder("buzzer", button, Duration::from_millis(30))
//!         .on_start(|| Ok(()))
//!         .on_stop(|| Ok(()))
//!         .build()?;
//!     runner.add(buzzer.into_activity(runner.terminate_on_cancel()));
//!
//!     let started = tokio::time::Instant::now();
//!     let report = runner
//!         .run(|cancel| {
//!             if started.elapsed() >= Duration::from_millis(300) {
//!                 cancel.cancel();
//!             }
//!             Ok(())
//!         })
//!         .await?;
//!
//!     assert_eq!(report.registered, 2);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
pub mod schedule;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::signals;
pub use core::{ActivityState, CancelHandle, RunReport, Runner, RunnerBuilder, RunnerConfig};
pub use error::{ActivityError, ConfigError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, CompletionPolicy, FailurePolicy, JitterPolicy};
pub use schedule::{
    AlwaysOn, Cancellable, Countdown, Deadline, Looped, NeverTerminate, OnOffCycle, Periodic,
    TerminateOnCancel, TimedEvents, Trigger, TriggeredSequence, Triggerable,
};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{Activity, ActivityFn, ActivityRef};
