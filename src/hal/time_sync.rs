use async_trait::async_trait;

use crate::error::ErrorCode;
use crate::hal::NodeId;

/// Consumer of the network's time synchronization protocol.
///
/// Bound to the node by the implementation; the supervisor starts it once
/// after bring-up and afterwards only reads the master identity.
#[async_trait]
pub trait TimeSyncSlave: Send + 'static {
    /// Subscribes to time sync messages.
    async fn start(&mut self) -> Result<(), ErrorCode>;

    /// Identity of the master currently followed, [`NodeId::UNSET`] if none.
    fn master_node_id(&self) -> NodeId;
}
