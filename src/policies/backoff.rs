//! # Backoff policy for bring-up retries.
//!
//! [`BackoffPolicy`] controls how long the bring-up supervisor waits after a
//! failed attempt. It is parameterized by:
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::first`] the initial delay;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay after failure `n` (0-indexed) is `first × factor^n`, clamped to `max`,
//! then jitter is applied. The base delay depends only on `n`, so jitter never
//! feeds back into later delays.
//!
//! The default is the fixed 3 second retry interval a field node uses: factor 1.0,
//! no jitter.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use nodevisor::{BackoffPolicy, JitterPolicy};
//!
//! let fixed = BackoffPolicy::default();
//! assert_eq!(fixed.next(0), Duration::from_secs(3));
//! assert_eq!(fixed.next(50), Duration::from_secs(3));
//!
//! let growing = BackoffPolicy {
//!     first: Duration::from_secs(1),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//! assert_eq!(growing.next(1), Duration::from_secs(2));
//! assert_eq!(growing.next(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter policy applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a constant 3 second delay without jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(3),
            max: Duration::from_secs(3),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Fixed delay, no growth, no jitter.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay following failure number `failures` (0-indexed).
    ///
    /// # Notes
    /// - `factor == 1.0` keeps the delay at `first` (up to `max`).
    /// - Non-finite or negative intermediate results clamp to `max`.
    pub fn next(&self, failures: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = failures.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
                self.max
            } else {
                Duration::from_secs_f64(unclamped_secs)
            };

        self.jitter.apply(base)
    }
}

/// TOML shape of [`BackoffPolicy`] (`[bringup.backoff]`).
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct BackoffSection {
    pub first_ms: u64,
    pub max_ms: u64,
    pub factor: f64,
    pub jitter: JitterPolicy,
}

impl Default for BackoffSection {
    fn default() -> Self {
        let d = BackoffPolicy::default();
        Self {
            first_ms: d.first.as_millis() as u64,
            max_ms: d.max.as_millis() as u64,
            factor: d.factor,
            jitter: d.jitter,
        }
    }
}

impl From<BackoffSection> for BackoffPolicy {
    fn from(s: BackoffSection) -> Self {
        Self {
            first: Duration::from_millis(s.first_ms),
            max: Duration::from_millis(s.max_ms),
            factor: s.factor,
            jitter: s.jitter,
        }
    }
}
