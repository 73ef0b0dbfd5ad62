//! # SubscriberSet: fan-out over multiple subscribers
//!
//! [`SubscriberSet`] hands each [`Event`] to every subscriber in registration
//! order. A panicking subscriber is isolated: the panic is caught, logged, and
//! the remaining subscribers still see the event.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::events::Event;

use super::Subscribe;

/// Ordered collection of subscribers.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Appends a subscriber.
    pub fn push(&mut self, sub: Arc<dyn Subscribe>) {
        self.subs.push(sub);
    }

    /// Delivers one event to every subscriber.
    pub fn emit(&self, event: &Event) {
        for sub in &self.subs {
            if catch_unwind(AssertUnwindSafe(|| sub.on_event(event))).is_err() {
                tracing::error!(
                    subscriber = sub.name(),
                    seq = event.seq,
                    "subscriber panicked while handling event"
                );
            }
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<EventKind>>);

    impl Subscribe for Recorder {
        fn on_event(&self, ev: &Event) {
            self.0.lock().unwrap().push(ev.kind);
        }
    }

    struct Exploder;

    impl Subscribe for Exploder {
        fn on_event(&self, _ev: &Event) {
            panic!("subscriber bug");
        }

        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[test]
    fn panicking_subscriber_does_not_starve_others() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![
            Arc::new(Exploder) as Arc<dyn Subscribe>,
            rec.clone() as Arc<dyn Subscribe>,
        ]);
        assert_eq!(set.len(), 2);

        set.emit(&Event::new(EventKind::RunStarted));
        set.emit(&Event::new(EventKind::RunFinished));

        assert_eq!(
            *rec.0.lock().unwrap(),
            vec![EventKind::RunStarted, EventKind::RunFinished]
        );
    }
}
