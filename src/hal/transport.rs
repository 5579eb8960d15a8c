/// CAN driver handle shared by both runtime tasks.
///
/// All methods take `&self`: implementations keep counters in atomics (or
/// hardware registers) so concurrent reads need no locking.
pub trait CanTransport: Send + Sync + 'static {
    /// Number of physical CAN interfaces.
    fn iface_count(&self) -> usize;

    /// Cumulative error count of interface `iface`, `None` if out of range.
    fn error_count(&self, iface: usize) -> Option<u64>;

    /// Returns whether any frame was sent or received since the previous call.
    ///
    /// Sampling clears the flag.
    fn had_activity(&self) -> bool;

    /// Error counters of every interface, in interface order.
    fn error_counts(&self) -> Vec<u64> {
        (0..self.iface_count())
            .map(|i| self.error_count(i).unwrap_or(0))
            .collect()
    }
}
