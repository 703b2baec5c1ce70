use tracing::debug;

use super::commit::CommitRecord;
use super::edge::{BranchId, EdgeKind};
use super::graph::Graph;
use super::node::{Node, NodeId, NodeType};
use crate::error::{GraphError, Result};

/// Turns an ordered commit list (newest first) into a [`Graph`].
///
/// Branch identity is assigned top-down: a commit inherits the branch of
/// the first child that names it as first parent, otherwise it opens a new
/// branch. The edge to a first parent carries the child's branch, edges to
/// later parents carry the parent's.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    node_branch: Vec<Option<BranchId>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, commits: Vec<CommitRecord>) -> Result<Graph> {
        let mut graph = Graph::empty();

        for (index, commit) in commits.iter().enumerate() {
            if graph.by_hash.contains_key(&commit.hash) {
                return Err(GraphError::DuplicateCommit(commit.hash.clone()));
            }
            let node = Node::new(commit.hash.clone(), NodeType::Commit, Some(index));
            let id = graph.alloc_node(node);
            graph.by_hash.insert(commit.hash.clone(), id);
        }

        // Parents outside the loaded range hang below the last commit
        let mut dangling = 0;
        for commit in &commits {
            for parent in &commit.parents {
                if !graph.by_hash.contains_key(parent) {
                    let id = graph.alloc_node(Node::new(parent.clone(), NodeType::EndCommit, None));
                    graph.by_hash.insert(parent.clone(), id);
                    dangling += 1;
                }
            }
        }

        self.node_branch = vec![None; graph.nodes.len()];
        for (index, commit) in commits.iter().enumerate() {
            let child = NodeId(index as u32);
            let branch = self.branch_of(&mut graph, child);

            for (k, parent_hash) in commit.parents.iter().enumerate() {
                let parent = graph.by_hash[parent_hash];
                if parent.index() <= index {
                    return Err(GraphError::ParentAboveChild {
                        child: commit.hash.clone(),
                        parent: parent_hash.clone(),
                    });
                }
                let edge_branch = if k == 0 {
                    if self.node_branch[parent.index()].is_none() {
                        self.node_branch[parent.index()] = Some(branch);
                    }
                    branch
                } else {
                    self.branch_of(&mut graph, parent)
                };

                let edge = graph.alloc_edge(child, parent, edge_branch, EdgeKind::Usual);
                graph.nodes[child.index()].down_edges.push(edge);
                graph.nodes[parent.index()].up_edges.push(edge);
            }
        }

        let all: Vec<NodeId> = (0..graph.nodes.len() as u32).map(NodeId).collect();
        graph.rows = all;
        for (row, node) in graph.rows.iter().enumerate() {
            graph.row_of[node.index()] = Some(row);
        }
        graph.commits = commits;

        debug!(
            rows = graph.rows.len(),
            edges = graph.edges.len(),
            branches = graph.branch_count,
            dangling,
            "built commit graph"
        );
        Ok(graph)
    }

    fn branch_of(&mut self, graph: &mut Graph, node: NodeId) -> BranchId {
        match self.node_branch[node.index()] {
            Some(branch) => branch,
            None => {
                let branch = graph.next_branch();
                self.node_branch[node.index()] = Some(branch);
                branch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diamond() -> Vec<CommitRecord> {
        vec![
            CommitRecord::bare("A", &["B", "C"]),
            CommitRecord::bare("B", &["D"]),
            CommitRecord::bare("C", &["D"]),
            CommitRecord::bare("D", &[]),
        ]
    }

    #[test]
    fn test_diamond_topology() {
        let graph = GraphBuilder::new().build(diamond()).unwrap();
        let a = graph.find("A").unwrap();
        let d = graph.find("D").unwrap();

        assert_eq!(graph.row_count(), 4);
        assert_eq!(graph.parents(a).len(), 2);
        assert_eq!(graph.children(d).len(), 2);
        assert!(graph.node(a).is_merge());
        assert!(graph.node(d).is_fork());

        // parent order is preserved
        let downs: Vec<&str> = graph
            .parents(a)
            .iter()
            .map(|e| graph.node(graph.edge(*e).down).hash.as_str())
            .collect();
        assert_eq!(downs, vec!["B", "C"]);
    }

    #[test]
    fn test_branch_assignment() {
        let graph = GraphBuilder::new().build(diamond()).unwrap();
        let a = graph.find("A").unwrap();
        let c = graph.find("C").unwrap();
        let to_b = graph.parents(a)[0];
        let to_c = graph.parents(a)[1];
        let c_to_d = graph.parents(c)[0];

        assert_eq!(graph.branch_count(), 2);
        assert_eq!(graph.edge(to_b).branch, BranchId(0));
        assert_eq!(graph.edge(to_c).branch, BranchId(1));
        assert_eq!(graph.edge(c_to_d).branch, BranchId(1));
    }

    #[test]
    fn test_dangling_parent_becomes_end_node() {
        let graph = GraphBuilder::new()
            .build(vec![
                CommitRecord::bare("x", &["y"]),
                CommitRecord::bare("y", &["outside"]),
            ])
            .unwrap();
        let end = graph.find("outside").unwrap();

        assert_eq!(graph.node(end).node_type, NodeType::EndCommit);
        assert_eq!(graph.row_of(end), Some(2));
        assert!(graph.commit(end).is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        let dup = GraphBuilder::new().build(vec![
            CommitRecord::bare("a", &[]),
            CommitRecord::bare("a", &[]),
        ]);
        assert_eq!(dup.unwrap_err(), GraphError::DuplicateCommit("a".into()));

        let unordered = GraphBuilder::new().build(vec![
            CommitRecord::bare("p", &[]),
            CommitRecord::bare("c", &["p"]),
        ]);
        assert_eq!(
            unordered.unwrap_err(),
            GraphError::ParentAboveChild {
                child: "c".into(),
                parent: "p".into()
            }
        );
    }
}
