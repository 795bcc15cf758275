use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// The node pool actions mutate.
///
/// Scene is a pure data layer: a generational arena of [`Node`]s. Handles are
/// stable across removals of other nodes; a removed node's handle resolves to
/// `None` forever after, which the action core treats as "target gone, steps
/// become no-ops".
#[derive(Default)]
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        self.nodes.insert(node)
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    #[must_use]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    pub fn remove_node(&mut self, handle: NodeHandle) -> Option<Node> {
        self.nodes.remove(handle)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }
}
