use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use super::commit::CommitRecord;
use super::edge::{BranchId, Edge, EdgeId, EdgeKind};
use super::element::GraphElement;
use super::node::{Node, NodeId, NodeType};
use crate::error::{GraphError, Result};
use crate::list::{Replace, UpdateRequest};

/// Half-open range of rows
pub type RowRange = Range<usize>;

/// Bookkeeping for one collapsed fragment, keyed by its edge node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRecord {
    pub upper: NodeId,
    pub lower: NodeId,
    /// Hidden nodes, top to bottom
    pub interior: Vec<NodeId>,
    /// Original edge from `upper` into the first interior node
    pub entry_edge: EdgeId,
    /// Original edge from the last interior node into `lower`
    pub exit_edge: EdgeId,
    /// Synthetic edges `upper -> edge node` and `edge node -> lower`
    pub fold_edges: [EdgeId; 2],
}

/// The commit graph: an arena of nodes and edges plus the visible row table.
///
/// Handles are stable for the lifetime of the graph. Row numbers are not:
/// every structural mutation goes through [`Graph::splice_rows`], which
/// renumbers the tail of the table and reports the change as an
/// [`UpdateRequest`].
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) commits: Vec<CommitRecord>,
    pub(crate) by_hash: HashMap<String, NodeId>,
    /// Visible nodes, top to bottom
    pub(crate) rows: Vec<NodeId>,
    /// node index -> row, defined only while the node is visible
    pub(crate) row_of: Vec<Option<usize>>,
    pub(crate) branch_count: u32,
    pub(crate) folds: BTreeMap<NodeId, FoldRecord>,
    free_nodes: Vec<NodeId>,
    free_edges: Vec<EdgeId>,
    generation: u64,
}

impl Graph {
    pub(crate) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            commits: Vec::new(),
            by_hash: HashMap::new(),
            rows: Vec::new(),
            row_of: Vec::new(),
            branch_count: 0,
            folds: BTreeMap::new(),
            free_nodes: Vec::new(),
            free_edges: Vec::new(),
            generation: 0,
        }
    }

    /// Build a graph from commits listed newest first
    pub fn from_commits(commits: Vec<CommitRecord>) -> Result<Self> {
        super::builder::GraphBuilder::new().build(commits)
    }

    /// Number of visible rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of arena slots, hidden and freed nodes included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn branch_count(&self) -> usize {
        self.branch_count as usize
    }

    /// Bumped on every structural mutation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Commit metadata behind a `Commit` node
    pub fn commit(&self, id: NodeId) -> Option<&CommitRecord> {
        self.node(id).record.and_then(|i| self.commits.get(i))
    }

    pub fn find(&self, hash: &str) -> Option<NodeId> {
        self.by_hash.get(hash).copied()
    }

    /// Edges to the parents of `node`, in parse order
    pub fn parents(&self, node: NodeId) -> &[EdgeId] {
        self.node(node).down_edges()
    }

    /// Edges to the children of `node`, in parse order
    pub fn children(&self, node: NodeId) -> &[EdgeId] {
        self.node(node).up_edges()
    }

    pub fn row_of(&self, node: NodeId) -> Option<usize> {
        self.row_of.get(node.index()).copied().flatten()
    }

    pub fn node_at(&self, row: usize) -> Result<NodeId> {
        self.rows.get(row).copied().ok_or(GraphError::RowOutOfRange {
            row,
            count: self.rows.len(),
        })
    }

    /// Visible nodes, top to bottom
    pub fn visible_nodes(&self) -> &[NodeId] {
        &self.rows
    }

    /// Rows of the upper and lower endpoint of an edge
    pub fn edge_rows(&self, edge: EdgeId) -> Option<(usize, usize)> {
        let e = self.edge(edge);
        Some((self.row_of(e.up)?, self.row_of(e.down)?))
    }

    pub fn fold(&self, edge_node: NodeId) -> Option<&FoldRecord> {
        self.folds.get(&edge_node)
    }

    /// Collapsed fragments, ordered by edge node handle
    pub fn folds(&self) -> impl Iterator<Item = (NodeId, &FoldRecord)> {
        self.folds.iter().map(|(id, record)| (*id, record))
    }

    /// Whether the element is currently on screen and can be clicked
    pub fn is_addressable(&self, element: GraphElement) -> bool {
        match element {
            GraphElement::Node(id) => id.index() < self.nodes.len() && self.row_of(id).is_some(),
            GraphElement::Edge(id) => {
                id.index() < self.edges.len() && {
                    let e = self.edge(id);
                    e.attached && self.row_of(e.up).is_some() && self.row_of(e.down).is_some()
                }
            }
        }
    }

    /// Row contiguity: every visible node maps back to its own row
    pub fn check_rows(&self) -> bool {
        let mut visible = 0;
        for (index, row) in self.row_of.iter().enumerate() {
            if let Some(row) = row {
                if self.rows.get(*row).map(|n| n.index()) != Some(index) {
                    return false;
                }
                visible += 1;
            }
        }
        visible == self.rows.len()
    }

    pub(crate) fn next_branch(&mut self) -> BranchId {
        let id = BranchId(self.branch_count);
        self.branch_count += 1;
        id
    }

    pub(crate) fn alloc_node(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free_nodes.pop() {
            self.nodes[id.index()] = node;
            self.row_of[id.index()] = None;
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.row_of.push(None);
        id
    }

    pub(crate) fn alloc_edge(
        &mut self,
        up: NodeId,
        down: NodeId,
        branch: BranchId,
        kind: EdgeKind,
    ) -> EdgeId {
        let edge = Edge::new(up, down, branch, kind);
        if let Some(id) = self.free_edges.pop() {
            self.edges[id.index()] = edge;
            return id;
        }
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(edge);
        id
    }

    /// Allocate a synthetic edge node; it gets a row once spliced in
    pub(crate) fn insert_synthetic_node(&mut self) -> NodeId {
        let mut node = Node::new(String::new(), NodeType::EdgeNode, None);
        node.visible = false;
        self.alloc_node(node)
    }

    /// Free a synthetic node that has already left the row table
    pub(crate) fn remove_synthetic_node(&mut self, id: NodeId) {
        debug_assert_eq!(self.node(id).node_type, NodeType::EdgeNode);
        debug_assert!(self.row_of(id).is_none());
        let node = &mut self.nodes[id.index()];
        node.up_edges.clear();
        node.down_edges.clear();
        node.visible = false;
        self.free_nodes.push(id);
    }

    pub(crate) fn free_edge(&mut self, id: EdgeId) {
        self.edges[id.index()].attached = false;
        self.free_edges.push(id);
    }

    pub(crate) fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        self.nodes[id.index()].visible = !hidden;
    }

    /// Swap `old` for `new` in one of the node's edge lists, keeping its slot
    pub(crate) fn swap_edge(
        &mut self,
        node: NodeId,
        old: EdgeId,
        new: EdgeId,
        upward: bool,
    ) -> bool {
        let list = if upward {
            &mut self.nodes[node.index()].up_edges
        } else {
            &mut self.nodes[node.index()].down_edges
        };
        match list.iter().position(|e| *e == old) {
            Some(slot) => {
                list[slot] = new;
                self.edges[old.index()].attached = false;
                self.edges[new.index()].attached = true;
                true
            }
            None => false,
        }
    }

    /// Replace rows `[from, to)` with `insert` and renumber everything after.
    ///
    /// This is the only place row indices change.
    pub(crate) fn splice_rows(
        &mut self,
        from: usize,
        to: usize,
        insert: &[NodeId],
    ) -> UpdateRequest {
        debug_assert!(from <= to && to <= self.rows.len());
        for node in &self.rows[from..to] {
            self.row_of[node.index()] = None;
        }
        self.rows.splice(from..to, insert.iter().copied());
        for (row, node) in self.rows.iter().enumerate().skip(from) {
            self.row_of[node.index()] = Some(row);
        }
        self.generation += 1;
        debug_assert!(self.check_rows());

        UpdateRequest {
            replace: Replace::new(from, to, insert.len()),
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(n: usize) -> Graph {
        let hashes: Vec<String> = (0..n).map(|i| format!("c{}", i)).collect();
        let commits = (0..n)
            .map(|i| {
                let parents: Vec<&str> = if i + 1 < n {
                    vec![hashes[i + 1].as_str()]
                } else {
                    vec![]
                };
                CommitRecord::bare(hashes[i].clone(), &parents)
            })
            .collect();
        Graph::from_commits(commits).unwrap()
    }

    #[test]
    fn test_row_lookup() {
        let graph = linear(4);
        assert_eq!(graph.row_count(), 4);
        for row in 0..4 {
            let node = graph.node_at(row).unwrap();
            assert_eq!(graph.row_of(node), Some(row));
        }
        assert_eq!(
            graph.node_at(4),
            Err(GraphError::RowOutOfRange { row: 4, count: 4 })
        );
        assert!(graph.check_rows());
    }

    #[test]
    fn test_splice_renumbers_tail() {
        let mut graph = linear(6);
        let c4 = graph.find("c4").unwrap();
        let update = graph.splice_rows(1, 4, &[]);

        assert_eq!(update.replace, Replace::new(1, 4, 0));
        assert_eq!(update.generation, 1);
        assert_eq!(graph.row_count(), 3);
        assert_eq!(graph.row_of(c4), Some(1));
        assert_eq!(graph.row_of(graph.find("c2").unwrap()), None);
        assert!(graph.check_rows());
    }

    #[test]
    fn test_swap_edge_keeps_slot() {
        let mut graph = Graph::from_commits(vec![
            CommitRecord::bare("m", &["a", "b"]),
            CommitRecord::bare("a", &[]),
            CommitRecord::bare("b", &[]),
        ])
        .unwrap();
        let m = graph.find("m").unwrap();
        let first = graph.parents(m)[0];
        let second = graph.parents(m)[1];
        let a = graph.edge(first).down;
        let branch = graph.edge(first).branch;
        let replacement = graph.alloc_edge(m, a, branch, EdgeKind::Fold);

        assert!(graph.swap_edge(m, first, replacement, false));
        assert_eq!(graph.parents(m), &[replacement, second]);
        assert!(!graph.edge(first).is_attached());
        assert!(!graph.is_addressable(GraphElement::Edge(first)));
    }
}
