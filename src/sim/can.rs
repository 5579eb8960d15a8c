//! Simulated multi-interface CAN driver.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use crate::error::{ErrorCode, NodeError};
use crate::hal::CanTransport;

/// Bitrates accepted by [`SimCanDriver::init`], in bit/s.
pub const SUPPORTED_BITRATES: [u32; 9] = [
    10_000, 20_000, 50_000, 100_000, 125_000, 250_000, 500_000, 800_000, 1_000_000,
];

/// Largest number of interfaces a driver instance can own.
const MAX_IFACES: usize = 3;

struct Iface {
    errors: AtomicU64,
}

/// CAN driver with atomic per-interface error counters and a shared activity flag.
pub struct SimCanDriver {
    bitrate: u32,
    ifaces: Vec<Iface>,
    activity: AtomicBool,
}

impl SimCanDriver {
    /// Initializes the driver.
    ///
    /// Fails with [`NodeError::Platform`] carrying [`ErrorCode::INVALID_PARAM`]
    /// if the bitrate is not supported or the interface count is out of range.
    pub fn init(bitrate: u32, iface_count: usize) -> Result<Arc<Self>, NodeError> {
        if !SUPPORTED_BITRATES.contains(&bitrate) || iface_count == 0 || iface_count > MAX_IFACES {
            return Err(NodeError::Platform {
                code: ErrorCode::INVALID_PARAM,
            });
        }
        let ifaces = (0..iface_count)
            .map(|_| Iface {
                errors: AtomicU64::new(0),
            })
            .collect();
        tracing::debug!(bitrate, iface_count, "can driver initialized");
        Ok(Arc::new(Self {
            bitrate,
            ifaces,
            activity: AtomicBool::new(false),
        }))
    }

    /// Configured bitrate, in bit/s.
    pub fn bitrate(&self) -> u32 {
        self.bitrate
    }

    /// Marks that a frame was sent or received.
    pub fn record_frame(&self) {
        self.activity.store(true, Ordering::Relaxed);
    }

    /// Adds `n` bus errors to interface `iface`. Out-of-range interfaces are ignored.
    pub fn inject_errors(&self, iface: usize, n: u64) {
        if let Some(i) = self.ifaces.get(iface) {
            i.errors.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Spawns a task that records a frame at random intervals below `max_gap`.
    pub fn spawn_traffic(self: &Arc<Self>, max_gap: Duration) -> JoinHandle<()> {
        let me = Arc::clone(self);
        let max_ms = max_gap.as_millis().clamp(1, u128::from(u64::MAX)) as u64;
        tokio::spawn(async move {
            loop {
                let gap = rand::rng().random_range(0..=max_ms);
                tokio::time::sleep(Duration::from_millis(gap)).await;
                me.record_frame();
            }
        })
    }
}

impl CanTransport for SimCanDriver {
    fn iface_count(&self) -> usize {
        self.ifaces.len()
    }

    fn error_count(&self, iface: usize) -> Option<u64> {
        self.ifaces
            .get(iface)
            .map(|i| i.errors.load(Ordering::Relaxed))
    }

    fn had_activity(&self) -> bool {
        self.activity.swap(false, Ordering::Relaxed)
    }
}
