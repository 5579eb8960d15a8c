//! # Event subscribers.
//!
//! Extension point for reacting to lifecycle events published on the
//! [`Bus`](crate::events::Bus): alarming, metrics, test recorders.
//!
//! ## Architecture
//! ```text
//!   Bus ──► subscriber_listener ──► SubscriberSet::emit(&Event)
//!                                         │
//!                          ┌──────────────┼──────────────┐
//!                          ▼              ▼              ▼
//!                   LifecycleTracker   custom #1  ...  custom #N
//! ```
//!
//! ## Implementing a subscriber
//! ```no_run
//! use async_trait::async_trait;
//! use nodevisor::{Event, EventKind, Subscribe};
//!
//! struct ErrorRateAlarm;
//!
//! #[async_trait]
//! impl Subscribe for ErrorRateAlarm {
//!     async fn on_event(&self, ev: &Event) {
//!         if let (EventKind::HealthReport, Some(snap)) = (ev.kind, &ev.snapshot) {
//!             if snap.can_errors.iter().any(|&n| n > 10_000) {
//!                 // raise an alarm
//!             }
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "error-rate-alarm" }
//! }
//! ```

mod set;
mod subscriber;
mod tracker;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::EventLog;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
pub use tracker::{LifecycleSnapshot, LifecycleTracker};
