//! Runtime events: types and broadcast bus.
//!
//! Every lifecycle transition inside a [`Runner`](crate::Runner) becomes an
//! [`Event`]. Events are delivered two ways:
//! - synchronously to the runner's [`SubscriberSet`](crate::SubscriberSet)
//!   (the default [`LogWriter`](crate::LogWriter) lives there);
//! - on a [`Bus`] for async consumers ([`Runner::subscribe`](crate::Runner::subscribe)).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
