//! Restart decisions and delay policies.
//!
//! ## Contents
//! - [`CompletionPolicy`] / [`FailurePolicy`] what the runner does after one invocation
//! - [`BackoffPolicy`] how long to wait before restarting a failed activity
//! - [`JitterPolicy`]  randomization for computed durations
//!
//! ## Quick wiring
//! ```text
//! RunnerConfig { restart_on_completion, restart_on_exception, cancel_on_exception, restart_backoff }
//!      └─► core::handler::supervise uses:
//!           - completion_policy() / failure_policy() to decide restart/remove/escalate
//!           - restart_backoff.next(failures) to delay a failure-driven restart
//! ```

mod backoff;
mod jitter;
mod restart;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use restart::{CompletionPolicy, FailurePolicy};
