//! # Runner-wide cancel flag.
//!
//! [`CancelHandle`] is the `cancel` flag of a [`Runner`](crate::Runner). It is
//! level-triggered: once set it stays set until the next `run()` resets it.
//! Internally each run gets a fresh [`CancellationToken`], so the poll loop can
//! await cancellation instead of polling the flag.

use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// Cloneable handle to a runner's cancel flag.
///
/// Clones observe the same flag, including across resets.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: Arc<Mutex<CancellationToken>>,
}

impl CancelHandle {
    /// Creates a handle whose flag is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag. Idempotent.
    pub fn cancel(&self) {
        self.current().cancel();
    }

    /// Returns `true` once the flag is set.
    pub fn is_cancelled(&self) -> bool {
        self.current().is_cancelled()
    }

    /// Token for the current run.
    pub(crate) fn current(&self) -> CancellationToken {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clears the flag by installing a fresh token, which is returned.
    pub(crate) fn reset(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = fresh.clone();
        fresh
    }
}
