/// Single boolean output, typically a status LED on a GPIO pin.
pub trait Indicator: Send + Sync + 'static {
    /// Drives the output.
    fn set(&self, on: bool);
}
