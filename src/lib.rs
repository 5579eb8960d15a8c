//! # nodevisor
//!
//! **Nodevisor** brings a single CAN field-bus node up and keeps it running.
//!
//! It constructs the protocol node once, retries start-up and the network
//! compatibility check until both succeed, starts time synchronization,
//! then dispatches protocol traffic forever while a second task mirrors bus
//! activity on a status LED. Any fatal failure ends in a halt state that blinks
//! the LED for the rest of the process lifetime.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │  Supervisor                                                        │
//!   │  - Bus (broadcast events)                                          │
//!   │  - SubscriberSet (LifecycleTracker + user subscribers)             │
//!   │  - NodeSlot (construct-once protocol node)                         │
//!   │  - Platform (CanTransport, PlatformClock, Indicator)               │
//!   └──────┬───────────────────────────────────────────────┬─────────────┘
//!          ▼                                               ▼
//!   ┌──────────────────────────┐                 ┌───────────────────────┐
//!   │    supervisory task      │                 │    activity task      │
//!   │ BringUpSupervisor (retry)│                 │ ActivityIndicator     │
//!   │ start_time_sync          │                 │ (LED + clock print)   │
//!   │ DiagnosticsLoop (forever)│                 └───────────┬───────────┘
//!   └────────────┬─────────────┘                             │
//!                │ Publishes: StartAttempt, NetworkConflict, │ Publishes:
//!                │ BackoffScheduled, HealthReport, ...       │ ClockReport
//!                ▼                                           ▼
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │                     Bus (broadcast channel)                        │
//!   └─────────────────────────────────┬──────────────────────────────────┘
//!                                     ▼
//!                         subscriber_listener ─► SubscriberSet
//!                                                 ┌────┼────┐
//!                                                 ▼    ▼    ▼
//!                                          tracker  sub1  subN
//! ```
//!
//! ### Lifecycle
//! ```text
//! Unconstructed ─► Constructed ─► Starting ⇄ Retrying ─► Started
//!   ─► TimeSyncStarting ─► Operational (spin forever)
//!                     └──► FatalHalt (blink forever)
//! ```
//!
//! ## Features
//! | Area              | Description                                  | Key types / traits                  |
//! |-------------------|----------------------------------------------|-------------------------------------|
//! | **Supervision**   | Bring-up, time sync, diagnostics, halt       | [`Supervisor`], [`Platform`]        |
//! | **Collaborators** | Injected driver, protocol engine, clock, LED | [`ProtocolNode`], [`CanTransport`]  |
//! | **Policies**      | Retry pacing between attempts                | [`BackoffPolicy`], [`JitterPolicy`] |
//! | **Events**        | Lifecycle events and subscribers             | [`Event`], [`Subscribe`]            |
//! | **Simulation**    | In-process collaborators                     | [`sim`]                             |
//! | **Configuration** | TOML-backed runtime settings                 | [`Config`]                          |
//!
//! ## Optional features
//! - `logging` (default): exports [`EventLog`], a subscriber that echoes events at DEBUG.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use nodevisor::sim::{SimCanDriver, SimClock, SimIndicator, SimNode, SimTimeSync};
//! use nodevisor::{Config, Platform, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     cfg.validate()?;
//!
//!     let platform = Platform {
//!         transport: SimCanDriver::init(cfg.can_bitrate, cfg.can_interfaces)?,
//!         clock: Arc::new(SimClock::new()),
//!         indicator: Arc::new(SimIndicator::new()),
//!     };
//!     let pool = cfg.memory_pool_bytes;
//!
//!     let sup = Supervisor::builder(cfg, platform)
//!         .build(move || SimNode::new(pool), SimTimeSync::new())?;
//!     sup.run().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

pub mod hal;
pub mod logging;
pub mod sim;

// ---- Public re-exports ----

pub use core::{
    ActivityIndicator, BringUpReport, BringUpSupervisor, Config, DiagnosticSnapshot,
    DiagnosticsLoop, FatalHalt, NodeSlot, NodeState, OperationalNode, Platform, StartedNode,
    Supervisor, SupervisorBuilder, start_time_sync,
};
pub use error::{ConfigError, ErrorCode, NodeError};
pub use events::{Bus, Event, EventKind};
pub use hal::{
    AllocatorUsage, CanTransport, ClockReading, CompatibilityOutcome, Indicator, LogLevel,
    NodeHealth, NodeId, PlatformClock, ProtocolNode, TimeSyncSlave,
};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use subscribers::{LifecycleSnapshot, LifecycleTracker, Subscribe, SubscriberSet};

// Optional: built-in event echo subscriber.
// Enabled by default; disable with `--no-default-features`.
#[cfg(feature = "logging")]
pub use subscribers::EventLog;
