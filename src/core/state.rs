//! Node lifecycle states.
//!
//! ```text
//! Unconstructed ─► Constructed ─► Starting ⇄ Retrying ─► Started ─► TimeSyncStarting
//!                                                                      │
//!                                              Operational ◄───────────┤
//!                                              (spin forever)          └─► FatalHalt
//! ```

use std::fmt;

/// Where the node is in its lifecycle.
///
/// `Operational` is the only non-terminal steady state; `FatalHalt` is the only
/// terminal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeState {
    #[default]
    Unconstructed,
    Constructed,
    /// A bring-up attempt is in progress.
    Starting,
    /// The last attempt failed; waiting out the backoff.
    Retrying,
    /// Started and network-compatible.
    Started,
    /// The time sync slave is being started.
    TimeSyncStarting,
    Operational,
    FatalHalt,
}

impl NodeState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeState::FatalHalt)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeState::Unconstructed => "unconstructed",
            NodeState::Constructed => "constructed",
            NodeState::Starting => "starting",
            NodeState::Retrying => "retrying",
            NodeState::Started => "started",
            NodeState::TimeSyncStarting => "time_sync_starting",
            NodeState::Operational => "operational",
            NodeState::FatalHalt => "fatal_halt",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
