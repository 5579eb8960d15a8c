//! Collaborator seams.
//!
//! The supervisor never reaches into process-wide statics. Everything it talks
//! to is injected through one of these traits:
//!
//! - [`CanTransport`] CAN driver: per-interface error counters and activity flag
//! - [`ProtocolNode`] protocol engine: start, compatibility check, spin, logger, allocator
//! - [`TimeSyncSlave`] time synchronization consumer bound to the node
//! - [`PlatformClock`] UTC clock with adjustment statistics
//! - [`Indicator`] single boolean output (status LED)
//!
//! ```text
//!                 ┌──────────────┐
//!                 │  Supervisor  │
//!                 └──┬────────┬──┘
//!     supervisory    │        │   activity task
//!        task        ▼        ▼
//!   ProtocolNode  TimeSyncSlave   CanTransport ◄─── (both tasks, read-only)
//!                                 PlatformClock ◄── (both tasks, read-only)
//!                                 Indicator     ◄── (activity task / halt)
//! ```

mod clock;
mod indicator;
mod protocol;
mod time_sync;
mod transport;
mod types;

pub use clock::{ClockReading, PlatformClock};
pub use indicator::Indicator;
pub use protocol::ProtocolNode;
pub use time_sync::TimeSyncSlave;
pub use transport::CanTransport;
pub use types::{AllocatorUsage, CompatibilityOutcome, LogLevel, NodeHealth, NodeId};
