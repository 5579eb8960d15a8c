//! # In-process simulation backend.
//!
//! Implements every collaborator trait from [`hal`](crate::hal) without
//! hardware, for the demo binary and for tests:
//!
//! | Type              | Implements                                      |
//! |-------------------|-------------------------------------------------|
//! | [`SimCanDriver`]  | [`CanTransport`](crate::hal::CanTransport)      |
//! | [`SimNode`]       | [`ProtocolNode`](crate::hal::ProtocolNode)      |
//! | [`SimTimeSync`]   | [`TimeSyncSlave`](crate::hal::TimeSyncSlave)    |
//! | [`SimClock`]      | [`PlatformClock`](crate::hal::PlatformClock)    |
//! | [`SimIndicator`]  | [`Indicator`](crate::hal::Indicator)            |
//!
//! [`init_platform_or_halt`] assembles a [`Platform`](crate::Platform) from
//! these and halts when the driver rejects the configuration.
//!
//! Scripted results are queues. Once a queue is exhausted the default
//! (successful) behavior applies.

mod can;
mod clock;
mod indicator;
mod node;
mod platform;
mod time_sync;

pub use can::{SimCanDriver, SUPPORTED_BITRATES};
pub use clock::SimClock;
pub use indicator::SimIndicator;
pub use node::{SimNode, SimNodeHandle, SpinStep, BLOCK_SIZE};
pub use platform::init_platform_or_halt;
pub use time_sync::{SimTimeSync, SimTimeSyncHandle};
