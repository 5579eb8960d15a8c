//! Lifecycle events: types and broadcast bus.
//!
//! Every transition the supervisor drives (start attempts, conflicts, backoff,
//! time sync, health reports, halt) is published as an [`Event`] on the [`Bus`].
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `BringUpSupervisor`, `start_time_sync`, `DiagnosticsLoop`,
//!   `ActivityIndicator`, `FatalHalt`, `NodeSlot` (via the supervisor).
//! - **Consumers**: `Supervisor::subscriber_listener()` which fans out to the
//!   `SubscriberSet` (including the built-in `LifecycleTracker`).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
