//! Delivers runtime events to the subscriber set, then to the bus.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::events::{Bus, Event};
use crate::subscribers::SubscriberSet;

/// Shared by the runner and every supervising handler.
#[derive(Clone)]
pub(crate) struct Emitter {
    bus: Bus,
    subs: Arc<SubscriberSet>,
}

impl Emitter {
    pub(crate) fn new(bus: Bus, subs: SubscriberSet) -> Self {
        Self {
            bus,
            subs: Arc::new(subs),
        }
    }

    /// Subscribers see the event synchronously, before bus receivers.
    pub(crate) fn emit(&self, ev: Event) {
        self.subs.emit(&ev);
        self.bus.publish(ev);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }
}
