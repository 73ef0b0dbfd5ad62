//! # Per-activity state machine of one run.
//!
//! ```text
//! Pending ─► Running ─► Completed ─┬─► Running     (restart)
//!               ▲   └─► Failed ────┼─► Removed     (policy)
//!               └──────────────────┴─► Cancelled   (runner cancelled)
//!                                      Terminated  (grace window exceeded)
//! ```
//!
//! A slot is *settled* once its supervising handler has exited. The drain
//! phase waits for every slot to settle; unsettled slots are terminated.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lifecycle state of a registered activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityState {
    /// Registered, not yet invoked.
    Pending,
    /// An invocation is in flight.
    Running,
    /// The last invocation returned `Ok(())`.
    Completed,
    /// The last invocation failed or panicked.
    Failed,
    /// Dropped by policy; it will not run again.
    Removed,
    /// Stopped because the runner was cancelled; kept for the next run.
    Cancelled,
    /// Force-terminated after the grace window.
    Terminated,
}

impl ActivityState {
    /// Snake_case label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActivityState::Pending => "pending",
            ActivityState::Running => "running",
            ActivityState::Completed => "completed",
            ActivityState::Failed => "failed",
            ActivityState::Removed => "removed",
            ActivityState::Cancelled => "cancelled",
            ActivityState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

struct Slot {
    name: Arc<str>,
    state: ActivityState,
    settled: bool,
}

/// States of the activities of one run, indexed by registration order.
pub(crate) struct ActivityTable {
    slots: Mutex<Vec<Slot>>,
}

impl ActivityTable {
    pub(crate) fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let slots = names
            .into_iter()
            .map(|name| Slot {
                name: name.into(),
                state: ActivityState::Pending,
                settled: false,
            })
            .collect();
        Self {
            slots: Mutex::new(slots),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set(&self, id: usize, state: ActivityState) {
        if let Some(slot) = self.lock().get_mut(id) {
            slot.state = state;
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self, id: usize) -> Option<ActivityState> {
        self.lock().get(id).map(|s| s.state)
    }

    pub(crate) fn name(&self, id: usize) -> Arc<str> {
        self.lock()
            .get(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| Arc::from("?"))
    }

    /// Marks the handler of `id` as exited.
    pub(crate) fn settle(&self, id: usize) {
        if let Some(slot) = self.lock().get_mut(id) {
            slot.settled = true;
        }
    }

    /// Ids whose handler has not exited yet.
    pub(crate) fn unsettled(&self) -> Vec<usize> {
        self.lock()
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.settled)
            .map(|(id, _)| id)
            .collect()
    }

    pub(crate) fn snapshot(&self) -> Vec<(String, ActivityState)> {
        self.lock()
            .iter()
            .map(|s| (s.name.to_string(), s.state))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_states_and_settlement() {
        let table = ActivityTable::new(["button", "buzzer"]);
        assert_eq!(table.state(0), Some(ActivityState::Pending));
        assert_eq!(table.unsettled(), vec![0, 1]);

        table.set(1, ActivityState::Running);
        table.set(1, ActivityState::Removed);
        table.settle(1);
        table.set(7, ActivityState::Running);

        assert_eq!(table.unsettled(), vec![0]);
        assert_eq!(&*table.name(1), "buzzer");
        assert_eq!(
            table.snapshot(),
            vec![
                ("button".to_string(), ActivityState::Pending),
                ("buzzer".to_string(), ActivityState::Removed),
            ]
        );
        assert_eq!(ActivityState::Terminated.to_string(), "terminated");
    }
}
