//! # Fatal halt: the terminal state.
//!
//! Logs the status code once, then blinks the indicator off/on forever.
//! Nothing is retried and nothing resets the node; an external watchdog is
//! the only way out.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::{
    error::ErrorCode,
    events::{Bus, Event, EventKind},
    hal::Indicator,
};

/// Terminal failure handler.
pub struct FatalHalt {
    indicator: Arc<dyn Indicator>,
    bus: Option<Bus>,
    half_period: Duration,
}

impl FatalHalt {
    pub fn new(indicator: Arc<dyn Indicator>, half_period: Duration) -> Self {
        Self {
            indicator,
            bus: None,
            half_period,
        }
    }

    /// Also publish a `Halted` event when entering the halt state.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Enters the halt state. Never returns.
    pub async fn enter(self, code: ErrorCode, reason: &str) -> Infallible {
        tracing::error!(code = code.get(), reason, "fatal failure, halting");
        if let Some(bus) = &self.bus {
            bus.publish(
                Event::new(EventKind::Halted)
                    .with_code(code)
                    .with_reason(reason),
            );
        }

        loop {
            self.indicator.set(false);
            time::sleep(self.half_period).await;
            self.indicator.set(true);
            time::sleep(self.half_period).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimIndicator;

    #[tokio::test(start_paused = true)]
    async fn blinks_and_never_returns() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();
        let led = Arc::new(SimIndicator::new());
        let halt = FatalHalt::new(led.clone(), Duration::from_secs(1)).with_bus(bus);

        let res = time::timeout(
            Duration::from_millis(4500),
            halt.enter(ErrorCode::DRIVER, "platform_init_failed"),
        )
        .await;
        assert!(res.is_err(), "halt must not return");

        assert_eq!(led.writes(), vec![false, true, false, true, false]);

        let ev = rx.try_recv().expect("halted event");
        assert_eq!(ev.kind, EventKind::Halted);
        assert_eq!(ev.code, Some(ErrorCode::DRIVER));
        assert!(rx.try_recv().is_err(), "logged once");
    }
}
