//! # LogWriter: events as `tracing` records
//!
//! Installed by default on every [`Runner`](crate::Runner). Levels:
//! - `error`: user callback failures, force-terminated activities
//! - `warn`: activity failures, grace window exceeded
//! - `info`: run start/finish, cancellation, removals
//! - `debug`: per-invocation lifecycle (starting, completed, restarts)

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default, Debug, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Subscribe for LogWriter {
    fn on_event(&self, e: &Event) {
        let activity = e.activity.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::RunStarted => {
                tracing::info!(activities = e.count, "runner started");
            }
            EventKind::CancelRequested => {
                tracing::info!(reason, "runner cancel requested");
            }
            EventKind::AllStoppedWithinGrace => {
                tracing::info!("all activities stopped within grace window");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(
                    stragglers = e.count,
                    grace_ms = e.delay_ms,
                    "grace window exceeded; force-terminating"
                );
            }
            EventKind::CallbackFailed => {
                tracing::error!(error = reason, "runner callback failed; cancelling");
            }
            EventKind::RunFinished => {
                tracing::info!(force_terminated = e.count, "runner finished");
            }
            EventKind::ActivityStarting => {
                tracing::debug!(activity, attempt = e.attempt, "activity starting");
            }
            EventKind::ActivityCompleted => {
                tracing::debug!(activity, attempt = e.attempt, "activity completed");
            }
            EventKind::ActivityFailed => {
                tracing::warn!(activity, attempt = e.attempt, error = reason, "activity failed");
            }
            EventKind::RestartScheduled => {
                tracing::debug!(
                    activity,
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    "activity restart scheduled"
                );
            }
            EventKind::ActivityRemoved => {
                tracing::info!(activity, reason, "activity removed");
            }
            EventKind::ActivityCancelled => {
                tracing::debug!(activity, "activity stopped on cancel");
            }
            EventKind::ActivityTerminated => {
                tracing::error!(
                    activity,
                    "activity force-terminated; its cleanup callbacks did not run"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
