//! # NodeSlot: construct-once owner of the protocol node.
//!
//! The node is built lazily on first access and then lives as long as its
//! owner. Identity and name are applied exactly once, at construction.
//!
//! ```text
//! get_or_construct(make) ──► slot empty? ──yes──► make() → set_node_id → set_name → store
//!                                   │
//!                                   └──no───► return stored node (make is dropped unused)
//! ```

use crate::hal::{NodeId, ProtocolNode};

/// Owner of the single protocol node of this process.
pub struct NodeSlot<N> {
    node: Option<N>,
    id: NodeId,
    name: String,
}

impl<N: ProtocolNode> NodeSlot<N> {
    /// Creates an empty slot that will configure the node with `id` and `name`.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            node: None,
            id,
            name: name.into(),
        }
    }

    #[inline]
    pub fn is_constructed(&self) -> bool {
        self.node.is_some()
    }

    /// Returns the node, constructing it with `make` if this is the first access.
    ///
    /// Later calls ignore `make`: construction happens at most once.
    pub fn get_or_construct<F>(&mut self, make: F) -> &mut N
    where
        F: FnOnce() -> N,
    {
        self.node.get_or_insert_with(|| {
            let mut node = make();
            node.set_node_id(self.id);
            node.set_name(&self.name);
            node
        })
    }

    /// Returns the node if it has been constructed.
    pub fn get_mut(&mut self) -> Option<&mut N> {
        self.node.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimNode;

    #[test]
    fn constructs_once() {
        let mut slot = NodeSlot::new(NodeId::new(64), "org.example.node");
        let mut builds = 0;

        assert!(!slot.is_constructed());
        assert!(slot.get_mut().is_none());

        let node = slot.get_or_construct(|| {
            builds += 1;
            SimNode::new(4096)
        });
        assert_eq!(node.node_id(), NodeId::new(64));
        assert_eq!(node.name(), "org.example.node");

        let again = slot.get_or_construct(|| {
            builds += 1;
            SimNode::new(4096)
        });
        assert_eq!(again.node_id(), NodeId::new(64));
        assert_eq!(builds, 1);
        assert!(slot.is_constructed());
    }

    #[test]
    fn reconstruction_attempt_keeps_identity() {
        let mut slot = NodeSlot::new(NodeId::new(10), "first");
        slot.get_or_construct(|| SimNode::new(4096)).set_name("renamed-by-owner");

        let node = slot.get_or_construct(|| SimNode::new(4096));
        assert_eq!(node.name(), "renamed-by-owner");
        assert_eq!(node.node_id(), NodeId::new(10));
    }
}
