//! Plain data exchanged with collaborators.

use std::fmt;

use serde::Deserialize;

/// Node identity on the bus.
///
/// Unicast identities are `1..=127`. `0` is reserved for "unset": a fresh
/// protocol node and a time sync slave that has not heard a master yet both
/// report it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u8);

impl NodeId {
    /// The "no node" identity.
    pub const UNSET: NodeId = NodeId(0);
    /// Largest unicast identity.
    pub const MAX: u8 = 127;

    /// Wraps a raw identity without validation.
    #[inline]
    pub const fn new(raw: u8) -> Self {
        NodeId(raw)
    }

    /// Raw identity value.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// True for unicast identities (`1..=127`).
    #[inline]
    pub const fn is_unicast(self) -> bool {
        self.0 >= 1 && self.0 <= Self::MAX
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a network compatibility check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompatibilityOutcome {
    /// Peer already using our identity, if any.
    pub conflicting_node: Option<NodeId>,
}

impl CompatibilityOutcome {
    /// No conflicting peer was seen.
    pub const fn compatible() -> Self {
        Self {
            conflicting_node: None,
        }
    }

    /// `node` already holds our identity.
    pub const fn conflict(node: NodeId) -> Self {
        Self {
            conflicting_node: Some(node),
        }
    }

    /// True if the node may join the network.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.conflicting_node.is_none()
    }
}

/// Protocol engine allocator statistics, in blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocatorUsage {
    pub used_blocks: usize,
    pub free_blocks: usize,
}

/// Health code advertised by the node to its peers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeHealth {
    #[default]
    Initializing,
    Ok,
    Warning,
    Critical,
}

/// Verbosity of the node's on-bus diagnostic logger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    #[default]
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicast_range() {
        assert!(!NodeId::UNSET.is_unicast());
        assert!(NodeId::new(1).is_unicast());
        assert!(NodeId::new(127).is_unicast());
        assert!(!NodeId::new(128).is_unicast());
    }

    #[test]
    fn compatibility_outcome() {
        assert!(CompatibilityOutcome::compatible().is_ok());
        let c = CompatibilityOutcome::conflict(NodeId::new(42));
        assert!(!c.is_ok());
        assert_eq!(c.conflicting_node, Some(NodeId::new(42)));
    }
}
