//! # Bus activity indicator.
//!
//! Mirrors bus traffic on the status LED and prints clock statistics once per
//! cycle. Runs on its own task, concurrently with the supervisory task, and
//! never touches the node.
//!
//! ```text
//! loop {
//!   repeat samples_per_cycle times:
//!     indicator.set(transport.had_activity())
//!     sleep(sample_period)
//!   log clock reading + publish ClockReport
//! }
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::{
    core::config::Config,
    events::{Bus, Event, EventKind},
    hal::{CanTransport, ClockReading, Indicator, PlatformClock},
};

/// Heartbeat driver for the status indicator.
pub struct ActivityIndicator {
    transport: Arc<dyn CanTransport>,
    clock: Arc<dyn PlatformClock>,
    indicator: Arc<dyn Indicator>,
    bus: Bus,
    sample_period: Duration,
    samples_per_cycle: u32,
    cycle: u32,
}

impl ActivityIndicator {
    pub fn new(
        transport: Arc<dyn CanTransport>,
        clock: Arc<dyn PlatformClock>,
        indicator: Arc<dyn Indicator>,
        bus: Bus,
        cfg: &Config,
    ) -> Self {
        Self {
            transport,
            clock,
            indicator,
            bus,
            sample_period: cfg.sample_period,
            samples_per_cycle: cfg.samples_per_cycle,
            cycle: 0,
        }
    }

    /// Runs cycles forever.
    pub async fn run(mut self) -> Infallible {
        loop {
            self.run_cycle().await;
        }
    }

    /// One full sampling cycle followed by one clock report.
    pub async fn run_cycle(&mut self) -> ClockReading {
        for _ in 0..self.samples_per_cycle {
            self.indicator.set(self.transport.had_activity());
            time::sleep(self.sample_period).await;
        }

        self.cycle = self.cycle.wrapping_add(1);
        let reading = self.clock.read();
        tracing::info!(
            utc_sec = reading.utc_secs(),
            abs_correction_usec = reading.prev_adjustment_usec,
            speed_correction_ppm = reading.speed_correction_ppm,
            jumps = reading.jump_count,
            "clock"
        );
        self.bus.publish(
            Event::new(EventKind::ClockReport)
                .with_attempt(self.cycle)
                .with_clock(reading),
        );
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimCanDriver, SimClock, SimIndicator};

    fn indicator_for(
        can: &Arc<SimCanDriver>,
        led: &Arc<SimIndicator>,
        bus: &Bus,
    ) -> ActivityIndicator {
        ActivityIndicator::new(
            can.clone(),
            Arc::new(SimClock::new()),
            led.clone(),
            bus.clone(),
            &Config::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn one_clock_report_per_cycle() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let can = SimCanDriver::init(1_000_000, 2).expect("valid bitrate");
        let led = Arc::new(SimIndicator::new());
        let mut activity = indicator_for(&can, &led, &bus);

        let start = time::Instant::now();
        activity.run_cycle().await;
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(led.writes().len(), 200);

        let ev = rx.try_recv().expect("clock report");
        assert_eq!(ev.kind, EventKind::ClockReport);
        assert_eq!(ev.attempt, Some(1));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reflects_activity_within_one_sample() {
        let bus = Bus::new(16);
        let can = SimCanDriver::init(1_000_000, 2).expect("valid bitrate");
        let led = Arc::new(SimIndicator::new());
        let activity = indicator_for(&can, &led, &bus);
        let task = tokio::spawn(activity.run());

        // Offset from the 25ms sampling grid so wakeups never tie.
        time::sleep(Duration::from_millis(110)).await;
        assert!(!led.is_on());

        can.record_frame();
        time::sleep(Duration::from_millis(25)).await;
        assert!(led.is_on());

        time::sleep(Duration::from_millis(25)).await;
        assert!(!led.is_on());

        task.abort();
    }
}
