use std::time::Duration;

/// Read-only view of the platform clock that time sync adjusts.
pub trait PlatformClock: Send + Sync + 'static {
    /// Current UTC time since the Unix epoch.
    fn utc(&self) -> Duration;

    /// Most recent adjustment applied to UTC, in microseconds (signed).
    fn prev_utc_adjustment_usec(&self) -> i64;

    /// Current speed correction, in parts per million.
    fn utc_speed_correction_ppm(&self) -> f32;

    /// Number of step adjustments ("jumps") applied so far.
    fn utc_jump_count(&self) -> u32;

    /// Reads every statistic at once.
    fn read(&self) -> ClockReading {
        ClockReading {
            utc: self.utc(),
            prev_adjustment_usec: self.prev_utc_adjustment_usec(),
            speed_correction_ppm: self.utc_speed_correction_ppm(),
            jump_count: self.utc_jump_count(),
        }
    }
}

/// One reading of [`PlatformClock`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClockReading {
    pub utc: Duration,
    pub prev_adjustment_usec: i64,
    pub speed_correction_ppm: f32,
    pub jump_count: u32,
}

impl ClockReading {
    /// Whole UTC seconds.
    #[inline]
    pub fn utc_secs(&self) -> u64 {
        self.utc.as_secs()
    }
}
