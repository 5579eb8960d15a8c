//! # Diagnostics spin loop: the node's permanent steady state.
//!
//! ## Per iteration
//! ```text
//! spin(spin_timeout)  (bounded; optionally guarded by spin_deadline)
//!   ├─ Ok            ─► nothing extra
//!   ├─ Err(code)     ─► warn + publish SpinFailed   (not fatal, next iteration retries)
//!   └─ deadline hit  ─► warn + publish SpinFailed   (treated like Err)
//! capture DiagnosticSnapshot  (sync master, allocator, CAN error counters, clock)
//! log snapshot + node.log_info("app", "UTC .. sec, .. corr, .. jumps")
//! publish HealthReport
//! ```
//!
//! ## Rules
//! - Exactly one `HealthReport` per iteration, whatever the spin outcome.
//! - Snapshots are read fresh from collaborators every iteration and never kept.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::{
    core::{config::Config, time_sync::OperationalNode},
    error::NodeError,
    events::{Bus, Event, EventKind},
    hal::{
        AllocatorUsage, CanTransport, ClockReading, LogLevel, NodeId, PlatformClock, ProtocolNode,
        TimeSyncSlave,
    },
};

/// Health observed during one spin iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticSnapshot {
    /// 1-based iteration number.
    pub iteration: u32,
    /// Spin outcome; `None` if dispatch succeeded.
    pub spin_error: Option<NodeError>,
    /// Master followed by the time sync slave ([`NodeId::UNSET`] if none).
    pub sync_master: NodeId,
    pub allocator: AllocatorUsage,
    /// Cumulative error counter per CAN interface.
    pub can_errors: Vec<u64>,
    pub clock: ClockReading,
}

/// Steady-state loop over an operational node.
pub struct DiagnosticsLoop<'n, N, S> {
    node: &'n mut N,
    sync: S,
    transport: Arc<dyn CanTransport>,
    clock: Arc<dyn PlatformClock>,
    bus: Bus,
    spin_timeout: Duration,
    spin_deadline: Option<Duration>,
    iteration: u32,
}

impl<'n, N, S> DiagnosticsLoop<'n, N, S>
where
    N: ProtocolNode,
    S: TimeSyncSlave,
{
    /// Enters the steady state: marks the node healthy and sets its on-bus
    /// logger to informational verbosity.
    pub fn enter(
        op: OperationalNode<'n, N, S>,
        transport: Arc<dyn CanTransport>,
        clock: Arc<dyn PlatformClock>,
        bus: Bus,
        cfg: &Config,
    ) -> Self {
        let OperationalNode { node, sync, .. } = op;

        tracing::info!(node_id = node.node_id().get(), name = node.name(), "node started");
        node.set_status_ok();
        node.set_log_level(LogLevel::Info);
        bus.publish(Event::new(EventKind::Operational).with_node(node.node_id()));

        Self {
            node,
            sync,
            transport,
            clock,
            bus,
            spin_timeout: cfg.spin_timeout,
            spin_deadline: cfg.spin_deadline(),
            iteration: 0,
        }
    }

    /// Runs iterations forever.
    pub async fn run(mut self) -> Infallible {
        loop {
            self.iterate().await;
        }
    }

    /// Performs one spin and one health report.
    pub async fn iterate(&mut self) -> DiagnosticSnapshot {
        self.iteration = self.iteration.wrapping_add(1);
        let iteration = self.iteration;

        let spin_error = self.spin().await.err();
        if let Some(err) = &spin_error {
            tracing::warn!(iteration, error = %err, "spin failure");
            self.bus.publish(
                Event::new(EventKind::SpinFailed)
                    .with_attempt(iteration)
                    .with_code(err.code())
                    .with_reason(err.as_label()),
            );
        }

        let snapshot = DiagnosticSnapshot {
            iteration,
            spin_error,
            sync_master: self.sync.master_node_id(),
            allocator: self.node.allocator_usage(),
            can_errors: self.transport.error_counts(),
            clock: self.clock.read(),
        };

        tracing::info!(
            iteration,
            sync_master = snapshot.sync_master.get(),
            mem_used = snapshot.allocator.used_blocks,
            mem_free = snapshot.allocator.free_blocks,
            can_errors = ?snapshot.can_errors,
            "health"
        );

        let clock = snapshot.clock;
        self.node.log_info(
            "app",
            &format!(
                "UTC {} sec, {} corr, {} jumps",
                clock.utc_secs(),
                clock.speed_correction_ppm,
                clock.jump_count
            ),
        );
        tracing::info!(
            utc_sec = clock.utc_secs(),
            corr_ppm = clock.speed_correction_ppm,
            jumps = clock.jump_count,
            "clock"
        );

        self.bus.publish(
            Event::new(EventKind::HealthReport)
                .with_attempt(iteration)
                .with_node(snapshot.sync_master)
                .with_snapshot(snapshot.clone()),
        );
        snapshot
    }

    async fn spin(&mut self) -> Result<(), NodeError> {
        let timeout = self.spin_timeout;
        let res = match self.spin_deadline {
            Some(deadline) => match time::timeout(deadline, self.node.spin(timeout)).await {
                Ok(r) => r,
                Err(_elapsed) => return Err(NodeError::SpinTimeout { timeout: deadline }),
            },
            None => self.node.spin(timeout).await,
        };
        res.map_err(|code| NodeError::Spin { code })
    }
}
