//! # Supervisor: wires the node, its collaborators and both runtime tasks.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the node slot and
//! every injected collaborator. [`Supervisor::run`] starts the two tasks and
//! never returns.
//!
//! ## High-level architecture
//! ```text
//! run():
//!   subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!
//!   spawn activity task:
//!     ActivityIndicator::run()           (transport.had_activity → LED, clock print)
//!
//!   spawn supervisory task:
//!     NodeSlot::get_or_construct()       ─► publish NodeConstructed
//!     BringUpSupervisor::run()           ─► StartedNode        (retry forever)
//!     start_time_sync()                  ─► OperationalNode    (Err = fatal)
//!     DiagnosticsLoop::run()             ─► never returns
//!
//!   supervisory task ended (time sync failure or panic):
//!     abort activity task, await its exit
//!     FatalHalt::enter(code)             ─► blink forever
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use nodevisor::{Config, Platform, Supervisor};
//! use nodevisor::sim::{SimCanDriver, SimClock, SimIndicator, SimNode, SimTimeSync};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cfg = Config::default();
//!     let can = SimCanDriver::init(cfg.can_bitrate, cfg.can_interfaces).expect("bitrate");
//!     let platform = Platform {
//!         transport: can,
//!         clock: Arc::new(SimClock::new()),
//!         indicator: Arc::new(SimIndicator::new()),
//!     };
//!     let pool = cfg.memory_pool_bytes;
//!
//!     let sup = Supervisor::builder(cfg, platform)
//!         .build(move || SimNode::new(pool), SimTimeSync::new())
//!         .expect("valid config");
//!     sup.run().await;
//! }
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::{
    core::{
        activity::ActivityIndicator,
        bringup::BringUpSupervisor,
        builder::SupervisorBuilder,
        config::Config,
        diagnostics::DiagnosticsLoop,
        halt::FatalHalt,
        slot::NodeSlot,
        time_sync::start_time_sync,
    },
    error::NodeError,
    events::{Bus, Event, EventKind},
    hal::{CanTransport, Indicator, PlatformClock, ProtocolNode, TimeSyncSlave},
    subscribers::{LifecycleTracker, SubscriberSet},
};

/// Platform handles shared by both runtime tasks.
#[derive(Clone)]
pub struct Platform {
    pub transport: Arc<dyn CanTransport>,
    pub clock: Arc<dyn PlatformClock>,
    pub indicator: Arc<dyn Indicator>,
}

pub(crate) type NodeFactory<N> = Box<dyn FnOnce() -> N + Send + 'static>;

/// Owner of the node lifecycle.
pub struct Supervisor<N, S> {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    tracker: Arc<LifecycleTracker>,
    platform: Platform,
    slot: NodeSlot<N>,
    make_node: NodeFactory<N>,
    time_sync: S,
}

impl Supervisor<(), ()> {
    /// Starts building a supervisor.
    pub fn builder(cfg: Config, platform: Platform) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg, platform)
    }
}

impl<N, S> Supervisor<N, S>
where
    N: ProtocolNode,
    S: TimeSyncSlave,
{
    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        tracker: Arc<LifecycleTracker>,
        platform: Platform,
        make_node: NodeFactory<N>,
        time_sync: S,
    ) -> Self {
        let slot = NodeSlot::new(cfg.node_id, cfg.node_name.clone());
        Self {
            cfg,
            bus,
            subs,
            tracker,
            platform,
            slot,
            make_node,
            time_sync,
        }
    }

    /// Event bus shared with every component.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Built-in lifecycle tracker (also registered as a subscriber).
    pub fn tracker(&self) -> Arc<LifecycleTracker> {
        Arc::clone(&self.tracker)
    }

    /// Runs the node for the lifetime of the process.
    ///
    /// Returns only in the sense of the type system: the sole exit from the
    /// supervisory task leads into [`FatalHalt`], which loops forever.
    pub async fn run(self) -> Infallible {
        self.subscriber_listener();

        let Supervisor {
            cfg,
            bus,
            platform,
            slot,
            make_node,
            time_sync,
            ..
        } = self;

        let activity = ActivityIndicator::new(
            Arc::clone(&platform.transport),
            Arc::clone(&platform.clock),
            Arc::clone(&platform.indicator),
            bus.clone(),
            &cfg,
        );
        let activity = tokio::spawn(activity.run());

        let supervisory = tokio::spawn(supervise(
            cfg.clone(),
            bus.clone(),
            platform.clone(),
            slot,
            make_node,
            time_sync,
        ));

        let err = match supervisory.await {
            Ok(Ok(never)) => match never {},
            Ok(Err(e)) => e,
            Err(join) => NodeError::TaskDied {
                reason: join.to_string(),
            },
        };

        // Wait for the abort to land so no late sample overwrites the blink pattern.
        activity.abort();
        let _ = activity.await;
        FatalHalt::new(platform.indicator, cfg.blink_half_period)
            .with_bus(bus)
            .enter(err.code(), err.as_label())
            .await
    }

    /// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

/// Supervisory task: bring-up, time sync, then the diagnostics loop.
///
/// Only returns on a fatal error.
async fn supervise<N, S>(
    cfg: Config,
    bus: Bus,
    platform: Platform,
    mut slot: NodeSlot<N>,
    make_node: NodeFactory<N>,
    time_sync: S,
) -> Result<Infallible, NodeError>
where
    N: ProtocolNode,
    S: TimeSyncSlave,
{
    let node = slot.get_or_construct(make_node);
    tracing::info!(node_id = node.node_id().get(), name = node.name(), "node constructed");
    bus.publish(
        Event::new(EventKind::NodeConstructed)
            .with_node(node.node_id())
            .with_reason(node.name()),
    );

    let started = BringUpSupervisor::new(cfg.backoff, bus.clone()).run(node).await;
    let operational = start_time_sync(started, time_sync, &bus).await?;

    let diagnostics =
        DiagnosticsLoop::enter(operational, platform.transport, platform.clock, bus, &cfg);
    Ok(diagnostics.run().await)
}
