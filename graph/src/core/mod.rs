pub mod builder;
pub mod commit;
pub mod edge;
pub mod element;
pub mod graph;
pub mod node;

pub use builder::GraphBuilder;
pub use commit::CommitRecord;
pub use edge::{BranchId, Edge, EdgeId, EdgeKind};
pub use element::GraphElement;
pub use graph::{FoldRecord, Graph, RowRange};
pub use node::{EdgeList, Node, NodeId, NodeType};
