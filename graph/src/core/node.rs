use std::fmt;

use smallvec::SmallVec;

use super::edge::EdgeId;

/// Stable handle of a node inside a [`Graph`](super::Graph) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// A loaded commit
    Commit,
    /// Synthetic row standing in for a collapsed fragment
    EdgeNode,
    /// A parent referenced by a loaded commit but outside the loaded range
    EndCommit,
}

/// Ordered edge list; most commits have one or two parents/children
pub type EdgeList = SmallVec<[EdgeId; 2]>;

/// A node of the commit graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Commit hash; empty for synthetic edge nodes
    pub hash: String,
    pub node_type: NodeType,
    /// Edges to nodes rendered above (children), in parse order
    pub(crate) up_edges: EdgeList,
    /// Edges to nodes rendered below (parents), in parse order
    pub(crate) down_edges: EdgeList,
    /// Index into the graph's commit records, for `Commit` nodes
    pub(crate) record: Option<usize>,
    pub(crate) visible: bool,
}

impl Node {
    pub(crate) fn new(hash: String, node_type: NodeType, record: Option<usize>) -> Self {
        Self {
            hash,
            node_type,
            up_edges: EdgeList::new(),
            down_edges: EdgeList::new(),
            record,
            visible: true,
        }
    }

    pub fn up_edges(&self) -> &[EdgeId] {
        &self.up_edges
    }

    pub fn down_edges(&self) -> &[EdgeId] {
        &self.down_edges
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Check if this node is a merge (more than one parent)
    pub fn is_merge(&self) -> bool {
        self.down_edges.len() > 1
    }

    /// Check if this node is a fork point (more than one child)
    pub fn is_fork(&self) -> bool {
        self.up_edges.len() > 1
    }

    /// Short form of the hash for display
    pub fn short_hash(&self) -> &str {
        match self.hash.char_indices().nth(7) {
            Some((end, _)) => &self.hash[..end],
            None => &self.hash,
        }
    }
}
