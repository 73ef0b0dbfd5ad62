//! # What happens to an activity after one invocation.
//!
//! The runner exposes three boolean flags (`restart_on_completion`,
//! `restart_on_exception`, `cancel_on_exception`). They are folded into two
//! small enums so the supervising handler matches on a decision instead of
//! re-reading flag combinations.
//!
//! ```text
//! Ok(())  ──► CompletionPolicy::Restart  → run again after one tick
//!         └─► CompletionPolicy::Remove   → drop the activity
//!
//! Err(e)  ──► FailurePolicy::Restart      → run again after backoff   (restart_on_exception)
//!         ├─► FailurePolicy::CancelRunner → cancel the whole runner   (cancel_on_exception)
//!         └─► FailurePolicy::Drop         → swallow, drop the activity
//! ```
//!
//! Restart takes precedence over cancel when both flags are set.

/// Decision after an activity returned `Ok(())`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// Invoke the activity again.
    Restart,
    /// Remove the activity permanently.
    Remove,
}

impl CompletionPolicy {
    /// Builds the policy from the `restart_on_completion` flag.
    pub fn from_flag(restart_on_completion: bool) -> Self {
        if restart_on_completion {
            CompletionPolicy::Restart
        } else {
            CompletionPolicy::Remove
        }
    }
}

/// Decision after an activity returned an error (or panicked).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Invoke the activity again after the restart backoff.
    Restart,
    /// Set the runner-wide cancel flag.
    CancelRunner,
    /// Swallow the failure and remove the activity.
    Drop,
}

impl FailurePolicy {
    /// Builds the policy from `restart_on_exception` / `cancel_on_exception`.
    pub fn from_flags(restart_on_exception: bool, cancel_on_exception: bool) -> Self {
        match (restart_on_exception, cancel_on_exception) {
            (true, _) => FailurePolicy::Restart,
            (false, true) => FailurePolicy::CancelRunner,
            (false, false) => FailurePolicy::Drop,
        }
    }
}
