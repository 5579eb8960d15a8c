//! Runtime core: node lifecycle and the two runtime tasks.
//!
//! The public entry point is [`Supervisor`]; the stages it composes are public
//! too so that they can be driven one by one (tests, custom wiring).
//!
//! Internal modules:
//! - [`slot`]: construct-once owner of the protocol node;
//! - [`bringup`]: start + compatibility check, retried forever with backoff;
//! - [`time_sync`]: one-shot start of the time sync slave (failure is fatal);
//! - [`diagnostics`]: bounded spin + health report, forever;
//! - [`activity`]: bus activity LED and periodic clock print;
//! - [`halt`]: terminal blink loop;
//! - [`supervisor`]: wires everything and owns the tasks.

mod activity;
mod bringup;
mod builder;
mod config;
mod diagnostics;
mod halt;
mod slot;
mod state;
mod supervisor;
mod time_sync;

pub use activity::ActivityIndicator;
pub use bringup::{BringUpReport, BringUpSupervisor, StartedNode};
pub use builder::SupervisorBuilder;
pub use config::Config;
pub use diagnostics::{DiagnosticSnapshot, DiagnosticsLoop};
pub use halt::FatalHalt;
pub use slot::NodeSlot;
pub use state::NodeState;
pub use supervisor::{Platform, Supervisor};
pub use time_sync::{OperationalNode, start_time_sync};
