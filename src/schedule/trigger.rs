//! # Armed flags handed from producers to a triggered sequence.
//!
//! Producers (button handlers, sensors, network handlers) arm a [`Triggerable`];
//! exactly one consumer ([`TriggeredSequence`](crate::TriggeredSequence) or
//! [`TimedEvents::start_on`](crate::TimedEvents::start_on)) reads and clears it.
//!
//! - [`Trigger`] is edge-triggered: it stays armed until consumed, and must be
//!   re-armed for every new episode.
//! - [`AlwaysOn`] is permanently armed; clearing it has no effect.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A mutable "armed" flag.
pub trait Triggerable: Send + Sync {
    /// Returns `true` while armed.
    fn is_triggered(&self) -> bool;

    /// Arms (`true`) or clears (`false`) the flag.
    fn set_triggered(&self, triggered: bool);
}

/// Edge-triggered flag. Clones share the same flag.
///
/// # Example
/// ```
/// use coopvisor::{Trigger, Triggerable};
///
/// let button = Trigger::new();
/// let consumer = button.clone();
///
/// button.fire();
/// assert!(consumer.is_triggered());
/// consumer.set_triggered(false);
/// assert!(!button.is_triggered());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Trigger {
    armed: Arc<AtomicBool>,
}

impl Trigger {
    /// Creates a cleared trigger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the trigger.
    pub fn fire(&self) {
        self.set_triggered(true);
    }
}

impl Triggerable for Trigger {
    fn is_triggered(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    fn set_triggered(&self, triggered: bool) {
        self.armed.store(triggered, Ordering::Release);
    }
}

/// Permanently armed.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysOn;

impl Triggerable for AlwaysOn {
    fn is_triggered(&self) -> bool {
        true
    }

    fn set_triggered(&self, _triggered: bool) {}
}

impl<T: Triggerable + ?Sized> Triggerable for Arc<T> {
    fn is_triggered(&self) -> bool {
        (**self).is_triggered()
    }

    fn set_triggered(&self, triggered: bool) {
        (**self).set_triggered(triggered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_on_ignores_clear() {
        let t = AlwaysOn;
        t.set_triggered(false);
        assert!(t.is_triggered());
    }

    #[test]
    fn trigger_starts_cleared() {
        let t = Trigger::new();
        assert!(!t.is_triggered());
        t.fire();
        t.fire();
        assert!(t.is_triggered());
        t.set_triggered(false);
        assert!(!t.is_triggered());
    }
}
