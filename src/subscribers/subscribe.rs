//! # Core subscriber trait.

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called synchronously from the runner's poll loop, in publication order.
/// A panic inside `on_event` is caught and logged; it never reaches the runner.
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
