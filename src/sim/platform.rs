//! Simulated platform bring-up.

use std::sync::Arc;

use crate::core::{Config, FatalHalt, Platform};
use crate::hal::{Indicator, PlatformClock};

use super::SimCanDriver;

/// Initializes the simulated CAN driver from `cfg` and assembles a [`Platform`].
///
/// Returns the platform together with the concrete driver so the caller can
/// drive simulated traffic. If the driver rejects the configuration, the
/// process enters [`FatalHalt`] on `indicator` and this future never resolves.
pub async fn init_platform_or_halt(
    cfg: &Config,
    clock: Arc<dyn PlatformClock>,
    indicator: Arc<dyn Indicator>,
) -> (Platform, Arc<SimCanDriver>) {
    let can = match SimCanDriver::init(cfg.can_bitrate, cfg.can_interfaces) {
        Ok(can) => can,
        Err(e) => {
            let halt = FatalHalt::new(indicator, cfg.blink_half_period);
            match halt.enter(e.code(), e.as_label()).await {}
        }
    };
    let platform = Platform {
        transport: can.clone(),
        clock,
        indicator,
    };
    (platform, can)
}
