//! # Event echo subscriber.
//!
//! [`EventLog`] re-emits every bus event as one `tracing` line at DEBUG
//! (target `nodevisor::events`), for watching the lifecycle from the outside.
//!
//! ## Output format
//! ```text
//! [start-attempt] attempt=1
//! [start-failed] attempt=1 code=-4 reason=node_start_failed
//! [conflict] attempt=2 peer=42
//! [backoff] attempt=2 delay_ms=3000
//! [health] iteration=7 master=10 errors=[0, 3]
//! [halted] code=-3 reason=time_sync_start_failed
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Debug echo of the event stream.
///
/// Enabled via the `logging` feature.
#[derive(Default)]
pub struct EventLog;

fn opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

#[async_trait]
impl Subscribe for EventLog {
    async fn on_event(&self, e: &Event) {
        let line = match e.kind {
            EventKind::NodeConstructed => {
                format!("[constructed] id={} name={}", opt(e.node), opt(e.reason.as_deref()))
            }
            EventKind::StartAttempt => format!("[start-attempt] attempt={}", opt(e.attempt)),
            EventKind::StartFailed => format!(
                "[start-failed] attempt={} code={} reason={}",
                opt(e.attempt),
                opt(e.code),
                opt(e.reason.as_deref())
            ),
            EventKind::CompatibilityChecking => {
                format!("[compat-check] attempt={}", opt(e.attempt))
            }
            EventKind::NetworkConflict => {
                format!("[conflict] attempt={} peer={}", opt(e.attempt), opt(e.node))
            }
            EventKind::BackoffScheduled => format!(
                "[backoff] attempt={} delay_ms={}",
                opt(e.attempt),
                opt(e.delay_ms)
            ),
            EventKind::BringUpComplete => format!("[started] attempts={}", opt(e.attempt)),
            EventKind::TimeSyncStarting => "[time-sync-starting]".to_owned(),
            EventKind::TimeSyncStarted => "[time-sync-started]".to_owned(),
            EventKind::TimeSyncFailed => format!("[time-sync-failed] code={}", opt(e.code)),
            EventKind::Operational => format!("[operational] id={}", opt(e.node)),
            EventKind::SpinFailed => format!(
                "[spin-failed] iteration={} code={} reason={}",
                opt(e.attempt),
                opt(e.code),
                opt(e.reason.as_deref())
            ),
            EventKind::HealthReport => match &e.snapshot {
                Some(s) => format!(
                    "[health] iteration={} master={} errors={:?}",
                    s.iteration, s.sync_master, s.can_errors
                ),
                None => format!("[health] iteration={}", opt(e.attempt)),
            },
            EventKind::ClockReport => match e.clock {
                Some(c) => format!(
                    "[clock] cycle={} utc={} ppm={} jumps={}",
                    opt(e.attempt),
                    c.utc_secs(),
                    c.speed_correction_ppm,
                    c.jump_count
                ),
                None => format!("[clock] cycle={}", opt(e.attempt)),
            },
            EventKind::Halted => format!(
                "[halted] code={} reason={}",
                opt(e.code),
                opt(e.reason.as_deref())
            ),
            EventKind::SubscriberOverflow => {
                format!("[subscriber-overflow] {}", opt(e.reason.as_deref()))
            }
            EventKind::SubscriberPanicked => {
                format!("[subscriber-panicked] {}", opt(e.reason.as_deref()))
            }
        };
        tracing::debug!(target: "nodevisor::events", seq = e.seq, "{line}");
    }

    fn name(&self) -> &'static str {
        "event-log"
    }
}
