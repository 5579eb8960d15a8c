use std::sync::Arc;

use crate::{
    core::{
        config::Config,
        supervisor::{Platform, Supervisor},
    },
    error::ConfigError,
    events::Bus,
    hal::{ProtocolNode, TimeSyncSlave},
    subscribers::{LifecycleTracker, Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: Config,
    platform: Platform,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration and platform handles.
    pub fn new(cfg: Config, platform: Platform) -> Self {
        Self {
            cfg,
            platform,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues. A [`LifecycleTracker`] is always added.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and builds the supervisor.
    ///
    /// `make_node` is called once, lazily, when the supervisory task first needs
    /// the node. `time_sync` is started once bring-up succeeds.
    ///
    /// Must be called within a Tokio runtime: subscriber workers are spawned here.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if [`Config::validate`] rejects the configuration.
    pub fn build<N, S, F>(
        self,
        make_node: F,
        time_sync: S,
    ) -> Result<Supervisor<N, S>, ConfigError>
    where
        N: ProtocolNode,
        S: TimeSyncSlave,
        F: FnOnce() -> N + Send + 'static,
    {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let tracker = Arc::new(LifecycleTracker::new());

        let mut subscribers = self.subscribers;
        subscribers.push(tracker.clone());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));

        Ok(Supervisor::new_internal(
            self.cfg,
            bus,
            subs,
            tracker,
            self.platform,
            Box::new(make_node),
            time_sync,
        ))
    }
}
