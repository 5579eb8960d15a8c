//! # Stateful subscriber that follows the node lifecycle.
//!
//! [`LifecycleTracker`] folds lifecycle events into a [`LifecycleSnapshot`]:
//! the current [`NodeState`] plus counters for bring-up and steady-state
//! activity. It is always registered by the
//! [`SupervisorBuilder`](crate::core::SupervisorBuilder) and exposed via
//! [`Supervisor::tracker`](crate::core::Supervisor::tracker).
//!
//! ```text
//!  Bus ─► SubscriberSet ─► LifecycleTracker::on_event(&Event)
//!                                │
//!                                ▼
//!                 RwLock<LifecycleSnapshot> ─► snapshot().await
//! ```
//!
//! Counters take every event. State transitions are applied only for events
//! newer (by `seq`) than the last transition, so a late delivery never
//! rewinds the state.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::{DiagnosticSnapshot, NodeState};
use crate::error::ErrorCode;
use crate::events::{Event, EventKind};
use crate::hal::NodeId;

use super::Subscribe;

/// Point-in-time view of the node lifecycle.
#[derive(Clone, Debug, Default)]
pub struct LifecycleSnapshot {
    pub state: NodeState,
    /// Bring-up attempts started.
    pub start_attempts: u32,
    /// Compatibility checks run.
    pub compatibility_checks: u32,
    pub start_failures: u32,
    pub conflicts: u32,
    /// Most recent conflicting peer.
    pub last_conflict: Option<NodeId>,
    pub health_reports: u64,
    pub spin_failures: u64,
    pub clock_reports: u64,
    /// Latest health snapshot.
    pub last_health: Option<Arc<DiagnosticSnapshot>>,
    /// Code handed to the halt handler.
    pub halt_code: Option<ErrorCode>,
}

#[derive(Default)]
struct Inner {
    last_seq: u64,
    snap: LifecycleSnapshot,
}

/// Tracks the node lifecycle from published events.
#[derive(Default)]
pub struct LifecycleTracker {
    inner: RwLock<Inner>,
}

impl LifecycleTracker {
    /// Creates a tracker in the `Unconstructed` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current lifecycle view.
    pub async fn snapshot(&self) -> LifecycleSnapshot {
        self.inner.read().await.snap.clone()
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> NodeState {
        self.inner.read().await.snap.state
    }

    fn count(snap: &mut LifecycleSnapshot, ev: &Event) {
        match ev.kind {
            EventKind::StartAttempt => snap.start_attempts += 1,
            EventKind::CompatibilityChecking => snap.compatibility_checks += 1,
            EventKind::StartFailed => snap.start_failures += 1,
            EventKind::NetworkConflict => snap.conflicts += 1,
            EventKind::SpinFailed => snap.spin_failures += 1,
            EventKind::HealthReport => snap.health_reports += 1,
            EventKind::ClockReport => snap.clock_reports += 1,
            _ => {}
        }
    }

    fn transition(snap: &mut LifecycleSnapshot, ev: &Event) {
        // Nothing leaves the halt state.
        if snap.state.is_terminal() {
            return;
        }
        snap.state = match ev.kind {
            EventKind::NodeConstructed => NodeState::Constructed,
            EventKind::StartAttempt => NodeState::Starting,
            EventKind::StartFailed | EventKind::BackoffScheduled => NodeState::Retrying,
            EventKind::NetworkConflict => {
                snap.last_conflict = ev.node;
                NodeState::Retrying
            }
            EventKind::BringUpComplete => NodeState::Started,
            EventKind::TimeSyncStarting => NodeState::TimeSyncStarting,
            // `Operational` or `Halted` follows; the state holds until then.
            EventKind::TimeSyncStarted | EventKind::TimeSyncFailed => return,
            EventKind::Operational => NodeState::Operational,
            EventKind::HealthReport => {
                if let Some(s) = &ev.snapshot {
                    snap.last_health = Some(Arc::clone(s));
                }
                return;
            }
            EventKind::Halted => {
                snap.halt_code = ev.code;
                NodeState::FatalHalt
            }
            _ => return,
        };
    }
}

#[async_trait]
impl Subscribe for LifecycleTracker {
    async fn on_event(&self, ev: &Event) {
        let mut g = self.inner.write().await;
        Self::count(&mut g.snap, ev);
        if ev.seq > g.last_seq {
            g.last_seq = ev.seq;
            Self::transition(&mut g.snap, ev);
        }
    }

    fn name(&self) -> &'static str {
        "lifecycle-tracker"
    }

    fn queue_capacity(&self) -> usize {
        2048
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn follows_bring_up_sequence() {
        let t = LifecycleTracker::new();
        assert_eq!(t.state().await, NodeState::Unconstructed);

        for ev in [
            Event::new(EventKind::NodeConstructed),
            Event::new(EventKind::StartAttempt).with_attempt(1),
            Event::new(EventKind::CompatibilityChecking).with_attempt(1),
            Event::new(EventKind::NetworkConflict)
                .with_attempt(1)
                .with_node(NodeId::new(42)),
            Event::new(EventKind::BackoffScheduled).with_attempt(1),
            Event::new(EventKind::StartAttempt).with_attempt(2),
            Event::new(EventKind::CompatibilityChecking).with_attempt(2),
            Event::new(EventKind::BringUpComplete).with_attempt(2),
        ] {
            t.on_event(&ev).await;
        }

        let snap = t.snapshot().await;
        assert_eq!(snap.state, NodeState::Started);
        assert_eq!(snap.start_attempts, 2);
        assert_eq!(snap.compatibility_checks, 2);
        assert_eq!(snap.conflicts, 1);
        assert_eq!(snap.last_conflict, Some(NodeId::new(42)));
    }

    #[tokio::test]
    async fn time_sync_state_spans_the_start_call() {
        let t = LifecycleTracker::new();
        t.on_event(&Event::new(EventKind::BringUpComplete)).await;
        assert_eq!(t.state().await, NodeState::Started);

        t.on_event(&Event::new(EventKind::TimeSyncStarting)).await;
        assert_eq!(t.state().await, NodeState::TimeSyncStarting);

        t.on_event(&Event::new(EventKind::TimeSyncFailed).with_code(ErrorCode(-3)))
            .await;
        assert_eq!(t.state().await, NodeState::TimeSyncStarting);

        t.on_event(&Event::new(EventKind::Halted).with_code(ErrorCode(-3)))
            .await;
        assert_eq!(t.state().await, NodeState::FatalHalt);
    }

    #[tokio::test]
    async fn late_event_counts_but_keeps_state() {
        let t = LifecycleTracker::new();
        let old = Event::new(EventKind::StartAttempt);
        let new = Event::new(EventKind::NodeConstructed);

        t.on_event(&new).await;
        t.on_event(&old).await;

        let snap = t.snapshot().await;
        assert_eq!(snap.state, NodeState::Constructed);
        assert_eq!(snap.start_attempts, 1);
    }

    #[tokio::test]
    async fn halt_is_terminal() {
        let t = LifecycleTracker::new();
        t.on_event(&Event::new(EventKind::Halted).with_code(ErrorCode(-3)))
            .await;
        t.on_event(&Event::new(EventKind::Operational)).await;

        let snap = t.snapshot().await;
        assert_eq!(snap.state, NodeState::FatalHalt);
        assert_eq!(snap.halt_code, Some(ErrorCode(-3)));
    }
}
