//! # Activity abstractions.
//!
//! - [`Activity`] - trait for a repeatable async unit of work owned by a runner
//! - [`ActivityFn`] - closure-backed implementation
//! - [`ActivityRef`] - boxed activity as stored by the runner

mod activity;
mod activity_fn;

pub use activity::{Activity, ActivityRef};
pub use activity_fn::ActivityFn;
