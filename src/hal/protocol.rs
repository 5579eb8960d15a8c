use std::time::Duration;

use async_trait::async_trait;

use crate::error::ErrorCode;
use crate::hal::{AllocatorUsage, CompatibilityOutcome, LogLevel, NodeHealth, NodeId};

/// # Protocol engine node.
///
/// The supervisor owns exactly one instance for the process lifetime and is the
/// only caller; methods take `&mut self` accordingly.
///
/// ### Contract
/// - [`start`](ProtocolNode::start) is idempotent: once it has succeeded,
///   further calls return `Ok(())` without repeating one-time setup.
/// - [`spin`](ProtocolNode::spin) returns after at most `timeout`.
#[async_trait]
pub trait ProtocolNode: Send + 'static {
    fn node_id(&self) -> NodeId;
    fn set_node_id(&mut self, id: NodeId);

    fn name(&self) -> &str;
    fn set_name(&mut self, name: &str);

    /// Brings the node onto the bus. May take a while.
    async fn start(&mut self) -> Result<(), ErrorCode>;

    /// Checks that no visible peer holds this node's identity.
    async fn check_network_compatibility(&mut self) -> Result<CompatibilityOutcome, ErrorCode>;

    /// Dispatches incoming frames and timers for up to `timeout`.
    async fn spin(&mut self, timeout: Duration) -> Result<(), ErrorCode>;

    fn health(&self) -> NodeHealth;
    fn set_status_ok(&mut self);

    /// Sets the verbosity of the on-bus logger.
    fn set_log_level(&mut self, level: LogLevel);

    /// Emits an informational message through the on-bus logger.
    fn log_info(&mut self, source: &str, message: &str);

    fn allocator_usage(&self) -> AllocatorUsage;
}
