//! # Event subscribers.
//!
//! ```text
//! supervising handler ── Emitter::emit(Event) ──┬──► SubscriberSet ──► Subscribe::on_event(&Event)
//!                                               │          │
//!                                               │     ┌────┴─────┬──────────┐
//!                                               │     ▼          ▼          ▼
//!                                               │  LogWriter   Metrics    Custom
//!                                               │
//!                                               └──► Bus (broadcast, async receivers)
//! ```
//!
//! Subscribers are called inline from the runner's poll loop, so they must be
//! quick and must not block. Anything slow belongs behind
//! [`Runner::subscribe`](crate::Runner::subscribe) instead.
//!
//! ## Implementing a subscriber
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use coopvisor::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct FailureCounter(AtomicUsize);
//!
//! impl Subscribe for FailureCounter {
//!     fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ActivityFailed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
