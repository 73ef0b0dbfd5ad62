//! # Runtime events emitted by the runner and its supervising handlers.
//!
//! [`EventKind`] groups into:
//! - **Run events**: a `run()` call starting, being cancelled, draining, finishing
//! - **Activity events**: one invocation starting, completing, failing, restarting
//! - **Terminal events**: an activity leaving the active set (removed, cancelled, terminated)
//!
//! Each event carries a global, monotonically increasing `seq`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use coopvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ActivityFailed)
//!     .with_activity("ultrasonic")
//!     .with_reason("echo timeout")
//!     .with_attempt(3);
//!
//! assert_eq!(ev.kind, EventKind::ActivityFailed);
//! assert_eq!(ev.activity.as_deref(), Some("ultrasonic"));
//! assert_eq!(ev.attempt, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// `run()` started. Sets `count` (registered activities).
    RunStarted,

    /// The runner-wide cancel flag was observed. Sets `reason`.
    CancelRequested,

    /// Every activity stopped inside the grace window.
    AllStoppedWithinGrace,

    /// The grace window elapsed with activities still pending.
    /// Sets `count` (stragglers) and `delay_ms` (grace window).
    GraceExceeded,

    /// The user callback failed or panicked; always fatal to the run.
    /// Sets `reason`.
    CallbackFailed,

    /// `run()` is about to return. Sets `count` (force-terminated activities).
    RunFinished,

    // === Activity events ===
    /// An invocation is starting. Sets `activity`, `attempt` (1-based).
    ActivityStarting,

    /// An invocation returned `Ok(())`. Sets `activity`, `attempt`.
    ActivityCompleted,

    /// An invocation failed or panicked. Sets `activity`, `attempt`, `reason`.
    ActivityFailed,

    /// The activity will be invoked again after a delay.
    /// Sets `activity`, `attempt`, `delay_ms`.
    RestartScheduled,

    // === Terminal events ===
    /// The activity was removed by policy. Sets `activity`, `reason`.
    ActivityRemoved,

    /// The activity stopped because the runner was cancelled. Sets `activity`.
    ActivityCancelled,

    /// The activity was force-terminated after the grace window; its own
    /// cleanup (e.g. a pending `stop` callback) did not run. Sets `activity`.
    ActivityTerminated,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the activity, if applicable.
    pub activity: Option<Arc<str>>,
    /// Invocation count of the activity (starting from 1).
    pub attempt: Option<u32>,
    /// Human-readable reason (errors, removal cause, ...).
    pub reason: Option<Arc<str>>,
    /// A delay or window in milliseconds.
    pub delay_ms: Option<u32>,
    /// A number of activities.
    pub count: Option<u32>,
}

impl Event {
    /// Creates an event of `kind` with the current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            activity: None,
            attempt: None,
            reason: None,
            delay_ms: None,
            count: None,
        }
    }

    /// Attaches an activity name.
    #[inline]
    pub fn with_activity(mut self, name: impl Into<Arc<str>>) -> Self {
        self.activity = Some(name.into());
        self
    }

    /// Attaches an invocation count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Attaches an activity count (saturating).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n.min(u32::MAX as usize) as u32);
        self
    }
}
