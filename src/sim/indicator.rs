//! Simulated status LED.

use parking_lot::Mutex;

use crate::hal::Indicator;

/// Records every write; `is_on` reflects the last one.
#[derive(Default)]
pub struct SimIndicator {
    writes: Mutex<Vec<bool>>,
}

impl SimIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far, oldest first.
    pub fn writes(&self) -> Vec<bool> {
        self.writes.lock().clone()
    }

    pub fn is_on(&self) -> bool {
        self.writes.lock().last().copied().unwrap_or(false)
    }
}

impl Indicator for SimIndicator {
    fn set(&self, on: bool) {
        self.writes.lock().push(on);
    }
}
