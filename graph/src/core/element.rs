use super::edge::EdgeId;
use super::node::NodeId;

/// Anything the user can point at in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphElement {
    Node(NodeId),
    Edge(EdgeId),
}

impl From<NodeId> for GraphElement {
    fn from(node: NodeId) -> Self {
        GraphElement::Node(node)
    }
}

impl From<EdgeId> for GraphElement {
    fn from(edge: EdgeId) -> Self {
        GraphElement::Edge(edge)
    }
}
