//! Runtime core: the runner and its bookkeeping.
//!
//! Public API: [`Runner`], [`RunnerBuilder`], [`RunnerConfig`], [`RunReport`],
//! [`ActivityState`], [`CancelHandle`] and the [`signals`] helpers.
//!
//! Internal modules:
//! - `handler`: drives one activity with the restart/remove/escalate policy;
//! - `table`: per-activity state machine of one run;
//! - `emitter`: event fan-out to subscribers and the bus.

mod builder;
mod cancel;
mod config;
mod emitter;
mod handler;
mod runner;
pub mod signals;
mod table;

pub use builder::RunnerBuilder;
pub use cancel::CancelHandle;
pub use config::RunnerConfig;
pub use runner::{RunReport, Runner};
pub use table::ActivityState;
