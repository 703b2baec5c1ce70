use std::fmt;

use super::node::NodeId;

/// Stable handle of an edge inside a [`Graph`](super::Graph) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Lineage identity; lower ids were registered earlier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchId(pub(crate) u32);

impl BranchId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Regular parent-child relationship
    Usual,
    /// Synthetic edge attaching the edge node of a collapsed fragment
    Fold,
}

/// An edge connecting two nodes on adjacent levels of the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Node rendered above (the child)
    pub up: NodeId,
    /// Node rendered below (the parent)
    pub down: NodeId,
    pub branch: BranchId,
    pub kind: EdgeKind,
    /// Cleared while the edge is swapped out of its endpoints' edge lists
    pub(crate) attached: bool,
}

impl Edge {
    pub(crate) fn new(up: NodeId, down: NodeId, branch: BranchId, kind: EdgeKind) -> Self {
        Self {
            up,
            down,
            branch,
            kind,
            attached: true,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_fold(&self) -> bool {
        self.kind == EdgeKind::Fold
    }
}
