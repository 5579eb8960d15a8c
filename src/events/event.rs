//! # Lifecycle events emitted by the supervisor.
//!
//! [`EventKind`] classifies events into:
//! - **Bring-up**: construction, start attempts, compatibility, backoff
//! - **Dependency**: time sync start/failure
//! - **Steady state**: operational entry, spin failures, health and clock reports
//! - **Terminal**: halt
//! - **Subscriber**: overflow/panic of event consumers
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use nodevisor::{Event, EventKind, NodeId};
//!
//! let ev = Event::new(EventKind::NetworkConflict)
//!     .with_attempt(1)
//!     .with_node(NodeId::new(42));
//!
//! assert_eq!(ev.kind, EventKind::NetworkConflict);
//! assert_eq!(ev.node, Some(NodeId::new(42)));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::DiagnosticSnapshot;
use crate::error::ErrorCode;
use crate::hal::{ClockReading, NodeId};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Bring-up ===
    /// The protocol node was constructed and named.
    ///
    /// Sets: `node` (own identity), `reason` (node name)
    NodeConstructed,

    /// A bring-up attempt is calling `start()`.
    ///
    /// Sets: `attempt` (1-based)
    StartAttempt,

    /// `start()` or the compatibility check returned a negative code.
    ///
    /// Sets: `attempt`, `code`, `reason`
    StartFailed,

    /// `start()` succeeded; the compatibility check is about to run.
    ///
    /// Sets: `attempt`
    CompatibilityChecking,

    /// Another peer holds our identity.
    ///
    /// Sets: `attempt`, `node` (conflicting peer)
    NetworkConflict,

    /// The next bring-up attempt is scheduled.
    ///
    /// Sets: `attempt` (failed attempt), `delay_ms`, `reason`
    BackoffScheduled,

    /// Node is started and network-compatible.
    ///
    /// Sets: `attempt` (total attempts)
    BringUpComplete,

    // === Time sync ===
    /// Bring-up done; the time sync slave is being started.
    TimeSyncStarting,

    /// Time sync slave started.
    TimeSyncStarted,

    /// Time sync slave failed to start (fatal).
    ///
    /// Sets: `code`
    TimeSyncFailed,

    // === Steady state ===
    /// Diagnostics spin loop entered.
    Operational,

    /// One spin returned an error or overran its bound.
    ///
    /// Sets: `attempt` (iteration), `code`, `reason`
    SpinFailed,

    /// One per spin iteration.
    ///
    /// Sets: `attempt` (iteration), `node` (sync master), `snapshot`
    HealthReport,

    /// One per activity-indicator cycle.
    ///
    /// Sets: `attempt` (cycle), `clock`
    ClockReport,

    // === Terminal ===
    /// The fatal halt handler took over.
    ///
    /// Sets: `code`, `reason`
    Halted,

    // === Subscribers ===
    /// A subscriber dropped an event (queue full or closed).
    ///
    /// Sets: `reason`
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `reason`
    SubscriberPanicked,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Bring-up attempt, spin iteration or indicator cycle (1-based).
    pub attempt: Option<u32>,
    /// Collaborator status code.
    pub code: Option<ErrorCode>,
    /// Node identity relevant to the event (conflicting peer, sync master, self).
    pub node: Option<NodeId>,
    /// Backoff delay in milliseconds.
    pub delay_ms: Option<u32>,
    /// Human-readable detail.
    pub reason: Option<Arc<str>>,
    /// Diagnostic snapshot (health reports).
    pub snapshot: Option<Arc<DiagnosticSnapshot>>,
    /// Clock statistics (clock reports).
    pub clock: Option<ClockReading>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            attempt: None,
            code: None,
            node: None,
            delay_ms: None,
            reason: None,
            snapshot: None,
            clock: None,
        }
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    #[inline]
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    #[inline]
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_snapshot(mut self, snapshot: DiagnosticSnapshot) -> Self {
        self.snapshot = Some(Arc::new(snapshot));
        self
    }

    #[inline]
    pub fn with_clock(mut self, clock: ClockReading) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Creates a subscriber overflow event.
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::StartAttempt);
        let b = Event::new(EventKind::StartAttempt);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_saturates() {
        let ev = Event::new(EventKind::BackoffScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
