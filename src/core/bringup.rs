//! # Bring-up supervisor: start the node and join the network.
//!
//! Drives one constructed node to the started-and-compatible state. There is
//! no retry limit: a field node has no operator to give up to.
//!
//! ## Event flow
//! ```text
//! loop {
//!   ├─► attempt += 1
//!   ├─► publish StartAttempt{ attempt }
//!   ├─► node.start()
//!   │      └─ Err(code) ─► publish StartFailed ─────────────────────────┐
//!   ├─► publish CompatibilityChecking                                   │
//!   ├─► node.check_network_compatibility()                              │
//!   │      ├─ Err(code)             ─► publish StartFailed ─────────────┤
//!   │      ├─ Ok(conflict with peer) ─► publish NetworkConflict ────────┤
//!   │      └─ Ok(compatible)         ─► publish BringUpComplete, return  │
//!   │                                                                   ▼
//!   └─► delay = backoff.next(attempt - 1) ─► publish BackoffScheduled ─► sleep(delay)
//! }
//! ```
//!
//! ## Rules
//! - `start()` is called exactly once per attempt; the compatibility check only
//!   after a successful start.
//! - A conflict restarts from `start()`, which is a no-op on an already started node.
//! - The attempt counter never resets.

use std::time::Duration;

use tokio::time;

use crate::{
    error::NodeError,
    events::{Bus, Event, EventKind},
    hal::ProtocolNode,
    policies::BackoffPolicy,
};

/// Counters accumulated over the bring-up loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BringUpReport {
    /// Calls to `start()` (one per attempt).
    pub attempts: u32,
    /// Compatibility checks performed.
    pub compatibility_checks: u32,
    /// Checks that reported a conflicting peer.
    pub conflicts: u32,
    /// Total backoff requested between attempts.
    pub backoff_total: Duration,
}

/// A node that completed bring-up.
///
/// Only [`BringUpSupervisor::run`] creates this; the time sync starter consumes it.
pub struct StartedNode<'n, N> {
    pub(crate) node: &'n mut N,
    pub(crate) report: BringUpReport,
}

impl<'n, N> StartedNode<'n, N> {
    pub fn report(&self) -> &BringUpReport {
        &self.report
    }

    pub fn node(&self) -> &N {
        &*self.node
    }
}

/// Retry loop that brings the node onto the bus.
pub struct BringUpSupervisor {
    backoff: BackoffPolicy,
    bus: Bus,
}

impl BringUpSupervisor {
    pub fn new(backoff: BackoffPolicy, bus: Bus) -> Self {
        Self { backoff, bus }
    }

    /// Runs attempts until the node is started and network-compatible.
    ///
    /// Never gives up; the returned future completes only on success.
    pub async fn run<'n, N: ProtocolNode>(&self, node: &'n mut N) -> StartedNode<'n, N> {
        let mut report = BringUpReport::default();

        loop {
            report.attempts += 1;
            let attempt = report.attempts;

            match self.attempt(node, attempt, &mut report).await {
                Ok(()) => {
                    tracing::info!(attempts = attempt, "node started and network compatible");
                    self.bus
                        .publish(Event::new(EventKind::BringUpComplete).with_attempt(attempt));
                    return StartedNode { node, report };
                }
                Err(e) => {
                    let delay = self.backoff.next(attempt - 1);
                    report.backoff_total += delay;

                    self.bus.publish(
                        Event::new(EventKind::BackoffScheduled)
                            .with_attempt(attempt)
                            .with_delay(delay)
                            .with_reason(e.to_string()),
                    );
                    time::sleep(delay).await;
                }
            }
        }
    }

    /// One attempt: start, then check compatibility.
    async fn attempt<N: ProtocolNode>(
        &self,
        node: &mut N,
        attempt: u32,
        report: &mut BringUpReport,
    ) -> Result<(), NodeError> {
        self.bus
            .publish(Event::new(EventKind::StartAttempt).with_attempt(attempt));

        if let Err(code) = node.start().await {
            tracing::warn!(
                attempt,
                code = code.get(),
                "node initialization failure, will try again soon"
            );
            self.publish_failed(attempt, NodeError::Start { code });
            return Err(NodeError::Start { code });
        }

        tracing::info!(attempt, "checking network compatibility");
        self.bus
            .publish(Event::new(EventKind::CompatibilityChecking).with_attempt(attempt));
        report.compatibility_checks += 1;

        let outcome = match node.check_network_compatibility().await {
            Ok(outcome) => outcome,
            Err(code) => {
                tracing::warn!(
                    attempt,
                    code = code.get(),
                    "network compatibility check failure, will try again soon"
                );
                self.publish_failed(attempt, NodeError::Compatibility { code });
                return Err(NodeError::Compatibility { code });
            }
        };

        match outcome.conflicting_node {
            None => Ok(()),
            Some(peer) => {
                report.conflicts += 1;
                tracing::warn!(
                    attempt,
                    conflicting_node = peer.get(),
                    "network conflict, will try again soon"
                );
                self.bus.publish(
                    Event::new(EventKind::NetworkConflict)
                        .with_attempt(attempt)
                        .with_node(peer),
                );
                Err(NodeError::Conflict { node: peer })
            }
        }
    }

    fn publish_failed(&self, attempt: u32, err: NodeError) {
        self.bus.publish(
            Event::new(EventKind::StartFailed)
                .with_attempt(attempt)
                .with_code(err.code())
                .with_reason(err.as_label()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::hal::{CompatibilityOutcome, NodeId};
    use crate::sim::SimNode;

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try_without_backoff() {
        let bus = Bus::new(64);
        let mut node = SimNode::new(4096);
        node.set_node_id(NodeId::new(42));
        let started_at = time::Instant::now();

        let started = BringUpSupervisor::new(BackoffPolicy::default(), bus)
            .run(&mut node)
            .await;

        assert_eq!(started.node().node_id(), NodeId::new(42));
        assert_eq!(started.report().attempts, 1);
        assert_eq!(started.report().compatibility_checks, 1);
        assert_eq!(started_at.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_start_skips_compatibility_check() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut node = SimNode::new(4096);
        let handle = node.handle();
        handle.script_start([Err(ErrorCode::DRIVER), Err(ErrorCode::DRIVER)]);

        let started = BringUpSupervisor::new(BackoffPolicy::default(), bus)
            .run(&mut node)
            .await;
        let report = *started.report();

        assert_eq!(report.attempts, 3);
        assert_eq!(report.compatibility_checks, 1);
        assert_eq!(handle.start_calls(), 3);
        assert_eq!(handle.compat_checks(), 1);

        let events = drain(&mut rx);
        let failed: Vec<_> = events
            .iter()
            .filter(|e| e.kind == EventKind::StartFailed)
            .collect();
        assert_eq!(failed.len(), 2);
        assert!(failed.iter().all(|e| e.code == Some(ErrorCode::DRIVER)));
    }

    #[tokio::test(start_paused = true)]
    async fn compatibility_error_is_retried() {
        let bus = Bus::new(64);
        let mut node = SimNode::new(4096);
        let handle = node.handle();
        handle.script_compat([Err(ErrorCode::FAILURE), Ok(CompatibilityOutcome::compatible())]);

        let started = BringUpSupervisor::new(BackoffPolicy::default(), bus)
            .run(&mut node)
            .await;

        assert_eq!(started.report().attempts, 2);
        assert_eq!(started.report().compatibility_checks, 2);
        assert_eq!(started.report().conflicts, 0);
        assert_eq!(handle.setup_runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_follows_policy() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut node = SimNode::new(4096);
        node.handle().script_start([
            Err(ErrorCode::FAILURE),
            Err(ErrorCode::FAILURE),
            Err(ErrorCode::FAILURE),
        ]);
        let policy = BackoffPolicy {
            first: Duration::from_secs(1),
            max: Duration::from_secs(3),
            factor: 2.0,
            jitter: crate::policies::JitterPolicy::None,
        };

        let started = BringUpSupervisor::new(policy, bus).run(&mut node).await;
        assert_eq!(started.report().backoff_total, Duration::from_secs(1 + 2 + 3));

        let delays: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| e.kind == EventKind::BackoffScheduled)
            .map(|e| e.delay_ms)
            .collect();
        assert_eq!(delays, vec![Some(1000), Some(2000), Some(3000)]);
    }

    #[tokio::test(start_paused = true)]
    async fn conflict_reports_peer_identity() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let mut node = SimNode::new(4096);
        node.handle()
            .script_compat([Ok(CompatibilityOutcome::conflict(NodeId::new(42)))]);

        BringUpSupervisor::new(BackoffPolicy::default(), bus)
            .run(&mut node)
            .await;

        let conflict = drain(&mut rx)
            .into_iter()
            .find(|e| e.kind == EventKind::NetworkConflict)
            .expect("conflict published");
        assert_eq!(conflict.node, Some(NodeId::new(42)));
        assert_eq!(conflict.attempt, Some(1));
    }
}
