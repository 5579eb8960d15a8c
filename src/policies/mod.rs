//! Retry pacing for node bring-up.
//!
//! ## Contents
//! - [`BackoffPolicy`] how the delay between bring-up attempts evolves
//!   (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization to keep a rack of identical nodes from retrying in lockstep
//!
//! ## Wiring
//! ```text
//! Config { bringup.backoff: BackoffPolicy }
//!      └─► core::bringup::BringUpSupervisor uses backoff.next(failures) after every failed attempt
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=3s, factor=1.0 (constant), max=3s, jitter=None.

pub(crate) mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
