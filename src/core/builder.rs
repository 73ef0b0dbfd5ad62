use std::sync::Arc;

use crate::{
    core::{Runner, RunnerConfig},
    error::ConfigError,
    subscribers::{LogWriter, Subscribe, SubscriberSet},
};

/// Builder for a [`Runner`] with custom subscribers.
///
/// A [`LogWriter`] is installed unless [`without_logging`](Self::without_logging)
/// is called; it always comes first in delivery order.
pub struct RunnerBuilder {
    cfg: RunnerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    logging: bool,
}

impl RunnerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: RunnerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            logging: true,
        }
    }

    /// Replaces the extra subscribers.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Appends one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Skips the default [`LogWriter`].
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }

    /// Validates the configuration and builds the runner.
    pub fn build(self) -> Result<Runner, ConfigError> {
        self.cfg.validate()?;

        let mut subs = SubscriberSet::default();
        if self.logging {
            subs.push(Arc::new(LogWriter::new()));
        }
        for sub in self.subscribers {
            subs.push(sub);
        }
        Ok(Runner::new_internal(self.cfg, subs))
    }
}
