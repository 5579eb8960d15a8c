//! Simulated platform clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::hal::{ClockReading, PlatformClock};

#[derive(Clone, Copy)]
enum Utc {
    System,
    Fixed(Duration),
}

struct State {
    utc: Utc,
    prev_adjustment_usec: i64,
    speed_correction_ppm: f32,
    jump_count: u32,
}

/// Clock with settable UTC and synchronization statistics.
pub struct SimClock {
    state: Mutex<State>,
}

impl SimClock {
    /// Follows the host's wall clock; statistics start at zero.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                utc: Utc::System,
                prev_adjustment_usec: 0,
                speed_correction_ppm: 0.0,
                jump_count: 0,
            }),
        }
    }

    /// Always reports `reading`.
    pub fn fixed(reading: ClockReading) -> Self {
        let clock = Self::new();
        clock.set(reading);
        clock
    }

    /// Replaces every reported value.
    pub fn set(&self, reading: ClockReading) {
        let mut s = self.state.lock();
        s.utc = Utc::Fixed(reading.utc);
        s.prev_adjustment_usec = reading.prev_adjustment_usec;
        s.speed_correction_ppm = reading.speed_correction_ppm;
        s.jump_count = reading.jump_count;
    }

    /// Applies a master adjustment: the step becomes the previous adjustment,
    /// and steps larger than one second count as jumps.
    pub fn adjust(&self, usec: i64, ppm: f32) {
        let mut s = self.state.lock();
        s.prev_adjustment_usec = usec;
        s.speed_correction_ppm = ppm;
        if usec.unsigned_abs() > 1_000_000 {
            s.jump_count = s.jump_count.saturating_add(1);
        }
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformClock for SimClock {
    fn utc(&self) -> Duration {
        match self.state.lock().utc {
            Utc::Fixed(d) => d,
            Utc::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        }
    }

    fn prev_utc_adjustment_usec(&self) -> i64 {
        self.state.lock().prev_adjustment_usec
    }

    fn utc_speed_correction_ppm(&self) -> f32 {
        self.state.lock().speed_correction_ppm
    }

    fn utc_jump_count(&self) -> u32 {
        self.state.lock().jump_count
    }
}
