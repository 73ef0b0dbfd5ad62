//! # Supervising handler: one activity, many invocations.
//!
//! Every registered activity is driven by [`supervise`] until the runner is
//! cancelled or a policy removes it.
//!
//! ```text
//! loop {
//!   ├─► cancelled?                  → Cancelled (kept for the next run)
//!   ├─► Running, ActivityStarting
//!   ├─► activity.run()  (panics caught)
//!   │     ├─ Ok  → Completed; cancelled?       → Cancelled
//!   │     │        CompletionPolicy::Restart   → pause(tick), loop
//!   │     │        CompletionPolicy::Remove    → Removed
//!   │     └─ Err → Failed
//!   │              FailurePolicy::Restart      → pause(backoff(failures)), loop
//!   │              FailurePolicy::CancelRunner → cancel token → Escalated
//!   │              FailurePolicy::Drop         → Removed
//! }
//! ```
//!
//! ## Rules
//! - Invocations of one activity are strictly sequential.
//! - An invocation in flight is never interrupted by the handler; only the
//!   runner's grace window can drop it.
//! - Pauses between invocations end early on cancellation.
//! - The consecutive-failure counter resets on every `Ok(())`.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::emitter::Emitter;
use crate::core::table::{ActivityState, ActivityTable};
use crate::error::ActivityError;
use crate::events::{Event, EventKind};
use crate::policies::{BackoffPolicy, CompletionPolicy, FailurePolicy};
use crate::tasks::ActivityRef;

/// How a supervising handler ended.
pub(crate) enum HandlerExit {
    /// Stopped because the runner was cancelled.
    Cancelled(ActivityRef),
    /// Failed and cancelled the runner (`cancel_on_exception`).
    Escalated(ActivityRef),
    /// Removed by policy; the activity is dropped.
    Removed,
}

/// Everything a handler needs besides the activity itself.
pub(crate) struct HandlerCtx {
    pub(crate) id: usize,
    pub(crate) token: CancellationToken,
    pub(crate) table: Arc<ActivityTable>,
    pub(crate) emitter: Emitter,
    pub(crate) completion: CompletionPolicy,
    pub(crate) failure: FailurePolicy,
    pub(crate) backoff: BackoffPolicy,
    pub(crate) tick: Duration,
}

/// Drives `activity` per the policies in `ctx`; returns the slot id and the exit.
pub(crate) async fn supervise(mut activity: ActivityRef, ctx: HandlerCtx) -> (usize, HandlerExit) {
    let name = ctx.table.name(ctx.id);
    let mut attempt: u32 = 0;
    let mut failures: u32 = 0;

    let exit = loop {
        if ctx.token.is_cancelled() {
            break ctx.cancelled(activity, &name);
        }

        attempt = attempt.saturating_add(1);
        ctx.table.set(ctx.id, ActivityState::Running);
        ctx.emitter.emit(
            Event::new(EventKind::ActivityStarting)
                .with_activity(name.clone())
                .with_attempt(attempt),
        );

        let res = AssertUnwindSafe(activity.run())
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ActivityError::from_panic(payload)));

        match res {
            Ok(()) => {
                failures = 0;
                ctx.table.set(ctx.id, ActivityState::Completed);
                ctx.emitter.emit(
                    Event::new(EventKind::ActivityCompleted)
                        .with_activity(name.clone())
                        .with_attempt(attempt),
                );
                if ctx.token.is_cancelled() {
                    break ctx.cancelled(activity, &name);
                }
                match ctx.completion {
                    CompletionPolicy::Restart => {
                        if !ctx.pause(ctx.tick).await {
                            break ctx.cancelled(activity, &name);
                        }
                    }
                    CompletionPolicy::Remove => break ctx.removed(&name, "completed"),
                }
            }
            Err(e) => {
                ctx.table.set(ctx.id, ActivityState::Failed);
                ctx.emitter.emit(
                    Event::new(EventKind::ActivityFailed)
                        .with_activity(name.clone())
                        .with_attempt(attempt)
                        .with_reason(e.to_string()),
                );
                match ctx.failure {
                    FailurePolicy::Restart => {
                        let delay = ctx.backoff.next(failures);
                        failures = failures.saturating_add(1);
                        ctx.emitter.emit(
                            Event::new(EventKind::RestartScheduled)
                                .with_activity(name.clone())
                                .with_attempt(attempt)
                                .with_delay(delay),
                        );
                        if !ctx.pause(delay).await {
                            break ctx.cancelled(activity, &name);
                        }
                    }
                    FailurePolicy::CancelRunner => {
                        ctx.token.cancel();
                        break HandlerExit::Escalated(activity);
                    }
                    FailurePolicy::Drop => break ctx.removed(&name, "failed"),
                }
            }
        }
    };
    (ctx.id, exit)
}

impl HandlerCtx {
    /// Sleeps for `d`; returns `false` if the runner was cancelled first.
    async fn pause(&self, d: Duration) -> bool {
        select! {
            _ = time::sleep(d) => true,
            _ = self.token.cancelled() => false,
        }
    }

    fn cancelled(&self, activity: ActivityRef, name: &Arc<str>) -> HandlerExit {
        self.table.set(self.id, ActivityState::Cancelled);
        self.emitter
            .emit(Event::new(EventKind::ActivityCancelled).with_activity(name.clone()));
        HandlerExit::Cancelled(activity)
    }

    fn removed(&self, name: &Arc<str>, reason: &'static str) -> HandlerExit {
        self.table.set(self.id, ActivityState::Removed);
        self.emitter.emit(
            Event::new(EventKind::ActivityRemoved)
                .with_activity(name.clone())
                .with_reason(reason),
        );
        HandlerExit::Removed
    }
}
