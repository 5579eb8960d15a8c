//! # Time sync dependency starter.
//!
//! Started exactly once, right after bring-up. Ownership enforces the order:
//! it consumes the [`StartedNode`] and the slave, and only the returned
//! [`OperationalNode`] can enter the diagnostics loop.
//!
//! A failing start is not retried. It means the sync subsystem is misconfigured
//! or out of resources, not that the bus is temporarily unhappy.

use crate::{
    core::bringup::{BringUpReport, StartedNode},
    error::NodeError,
    events::{Bus, Event, EventKind},
    hal::TimeSyncSlave,
};

/// A started node with a running time sync slave.
pub struct OperationalNode<'n, N, S> {
    pub(crate) node: &'n mut N,
    pub(crate) sync: S,
    pub(crate) report: BringUpReport,
}

impl<'n, N, S: TimeSyncSlave> OperationalNode<'n, N, S> {
    pub fn report(&self) -> &BringUpReport {
        &self.report
    }

    pub fn time_sync(&self) -> &S {
        &self.sync
    }
}

/// Binds and starts the time sync slave.
///
/// # Errors
/// [`NodeError::TimeSync`] with the slave's code; the caller must treat it as fatal.
pub async fn start_time_sync<'n, N, S>(
    started: StartedNode<'n, N>,
    mut sync: S,
    bus: &Bus,
) -> Result<OperationalNode<'n, N, S>, NodeError>
where
    S: TimeSyncSlave,
{
    bus.publish(Event::new(EventKind::TimeSyncStarting));
    match sync.start().await {
        Ok(()) => {
            tracing::info!("time sync slave started");
            bus.publish(Event::new(EventKind::TimeSyncStarted));
            Ok(OperationalNode {
                node: started.node,
                sync,
                report: started.report,
            })
        }
        Err(code) => {
            tracing::error!(code = code.get(), "time sync slave failed to start");
            bus.publish(Event::new(EventKind::TimeSyncFailed).with_code(code));
            Err(NodeError::TimeSync { code })
        }
    }
}
