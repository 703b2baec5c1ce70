use tracing::{debug, warn};

use crate::core::{EdgeId, EdgeKind, FoldRecord, Graph, GraphElement, NodeId, NodeType};
use crate::error::{GraphError, Result};
use crate::list::UpdateRequest;

/// Smallest chain worth collapsing: folding one commit into one synthetic
/// row would hide nothing
pub const MIN_FRAGMENT_SIZE: usize = 2;

/// A run of single-parent, single-child commits on consecutive rows,
/// bounded by `upper` above and `lower` below.
///
/// Computed on demand and only valid for the graph state it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    upper: NodeId,
    lower: NodeId,
    /// Top to bottom
    interior: Vec<NodeId>,
    /// Entry edge, chain edges, exit edge, top to bottom
    edges: Vec<EdgeId>,
    /// Edge node standing in for the fragment while collapsed
    collapsed: Option<NodeId>,
}

impl Fragment {
    pub fn upper(&self) -> NodeId {
        self.upper
    }

    pub fn lower(&self) -> NodeId {
        self.lower
    }

    pub fn interior(&self) -> &[NodeId] {
        &self.interior
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.interior.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interior.is_empty()
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed.is_some()
    }

    pub fn edge_node(&self) -> Option<NodeId> {
        self.collapsed
    }

    pub fn contains(&self, element: GraphElement) -> bool {
        match element {
            GraphElement::Node(node) => self.interior.contains(&node),
            GraphElement::Edge(edge) => self.edges.contains(&edge),
        }
    }
}

/// Finds foldable fragments and collapses or expands them
#[derive(Debug, Clone)]
pub struct GraphFragmentController {
    min_fragment_size: usize,
}

impl Default for GraphFragmentController {
    fn default() -> Self {
        Self::new(MIN_FRAGMENT_SIZE)
    }
}

impl GraphFragmentController {
    pub fn new(min_fragment_size: usize) -> Self {
        Self {
            min_fragment_size: min_fragment_size.max(1),
        }
    }

    /// The fragment the clicked element belongs to, if any.
    ///
    /// Clicking the edge node of a collapsed fragment (or one of its fold
    /// edges) yields that collapsed fragment.
    pub fn relate_fragment(&self, graph: &Graph, element: GraphElement) -> Option<Fragment> {
        if !graph.is_addressable(element) {
            return None;
        }
        match element {
            GraphElement::Node(node) => {
                if graph.node(node).node_type == NodeType::EdgeNode {
                    return self.collapsed_fragment(graph, node);
                }
                self.chain_through(graph, node)
            }
            GraphElement::Edge(edge) => {
                let e = graph.edge(edge);
                if e.kind == EdgeKind::Fold {
                    let edge_node = if graph.node(e.up).node_type == NodeType::EdgeNode {
                        e.up
                    } else {
                        e.down
                    };
                    return self.collapsed_fragment(graph, edge_node);
                }
                self.chain_through(graph, e.down)
                    .or_else(|| self.chain_through(graph, e.up))
            }
        }
    }

    /// Visible commit with exactly one child and one parent, not attached
    /// to a collapsed fragment
    fn is_foldable(graph: &Graph, node: NodeId) -> bool {
        let n = graph.node(node);
        n.node_type == NodeType::Commit
            && n.is_visible()
            && n.up_edges().len() == 1
            && n.down_edges().len() == 1
            && !graph.edge(n.up_edges()[0]).is_fold()
            && !graph.edge(n.down_edges()[0]).is_fold()
    }

    fn chain_through(&self, graph: &Graph, seed: NodeId) -> Option<Fragment> {
        if !Self::is_foldable(graph, seed) {
            return None;
        }
        let bound = graph.node_count();

        let mut above = Vec::new();
        let mut top = seed;
        loop {
            if above.len() > bound {
                warn!(%seed, "fragment walk ran past the graph going up");
                return None;
            }
            let edge = *graph.children(top).first()?;
            let next = graph.edge(edge).up;
            if !Self::is_foldable(graph, next) || graph.row_of(next)? + 1 != graph.row_of(top)? {
                break;
            }
            above.push(next);
            top = next;
        }

        let mut below = Vec::new();
        let mut bottom = seed;
        loop {
            if below.len() > bound {
                warn!(%seed, "fragment walk ran past the graph going down");
                return None;
            }
            let edge = *graph.parents(bottom).first()?;
            let next = graph.edge(edge).down;
            if !Self::is_foldable(graph, next) || graph.row_of(bottom)? + 1 != graph.row_of(next)? {
                break;
            }
            below.push(next);
            bottom = next;
        }

        let interior: Vec<NodeId> = above
            .into_iter()
            .rev()
            .chain(std::iter::once(seed))
            .chain(below)
            .collect();
        if interior.len() < self.min_fragment_size {
            return None;
        }

        let entry = *graph.children(top).first()?;
        let mut edges = Vec::with_capacity(interior.len() + 1);
        edges.push(entry);
        for node in &interior {
            edges.push(*graph.parents(*node).first()?);
        }
        let exit = *edges.last()?;

        Some(Fragment {
            upper: graph.edge(entry).up,
            lower: graph.edge(exit).down,
            interior,
            edges,
            collapsed: None,
        })
    }

    fn collapsed_fragment(&self, graph: &Graph, edge_node: NodeId) -> Option<Fragment> {
        let record = graph.fold(edge_node)?;
        Some(Self::from_record(graph, edge_node, record))
    }

    fn from_record(graph: &Graph, edge_node: NodeId, record: &FoldRecord) -> Fragment {
        // interior nodes keep their own edge lists while hidden
        let mut edges = Vec::with_capacity(record.interior.len() + 1);
        edges.push(record.entry_edge);
        for node in &record.interior {
            if let Some(edge) = graph.parents(*node).first() {
                edges.push(*edge);
            }
        }
        Fragment {
            upper: record.upper,
            lower: record.lower,
            interior: record.interior.clone(),
            edges,
            collapsed: Some(edge_node),
        }
    }

    /// Every collapsed fragment, top to bottom
    pub fn hidden_fragments(&self, graph: &Graph) -> Vec<Fragment> {
        let mut fragments: Vec<Fragment> = graph
            .folds()
            .map(|(edge_node, record)| Self::from_record(graph, edge_node, record))
            .collect();
        fragments.sort_by_key(|f| f.collapsed.and_then(|n| graph.row_of(n)));
        fragments
    }

    /// Collapse the fragment into one synthetic row
    pub fn hide_fragment(&self, graph: &mut Graph, fragment: &Fragment) -> Result<UpdateRequest> {
        if fragment.is_collapsed() {
            return Err(GraphError::InvalidFragmentState(
                "fragment is already collapsed".to_string(),
            ));
        }
        if fragment.interior.is_empty() {
            return Err(GraphError::InvalidFragmentState(
                "fragment has no interior".to_string(),
            ));
        }
        if let Some(hidden) = fragment.interior.iter().find(|n| !graph.node(**n).is_visible()) {
            return Err(GraphError::InvalidFragmentState(format!(
                "node {} is already hidden",
                hidden
            )));
        }

        let stale = GraphError::StaleFragment {
            upper: fragment.upper,
            lower: fragment.lower,
        };
        let first_row = graph.row_of(fragment.interior[0]).ok_or_else(|| stale.clone())?;
        let contiguous = fragment
            .interior
            .iter()
            .enumerate()
            .all(|(i, node)| graph.row_of(*node) == Some(first_row + i));
        let entry = fragment.edges[0];
        let exit = fragment.edges[fragment.edges.len() - 1];
        let attached = graph.edge(entry).is_attached()
            && graph.edge(exit).is_attached()
            && graph.parents(fragment.upper).contains(&entry)
            && graph.children(fragment.lower).contains(&exit);
        if !contiguous || !attached {
            return Err(stale);
        }

        let edge_node = graph.insert_synthetic_node();
        let entry_branch = graph.edge(entry).branch;
        let exit_branch = graph.edge(exit).branch;
        let up_fold = graph.alloc_edge(fragment.upper, edge_node, entry_branch, EdgeKind::Fold);
        let down_fold = graph.alloc_edge(edge_node, fragment.lower, exit_branch, EdgeKind::Fold);
        graph.nodes[edge_node.index()].up_edges.push(up_fold);
        graph.nodes[edge_node.index()].down_edges.push(down_fold);

        graph.swap_edge(fragment.upper, entry, up_fold, false);
        graph.swap_edge(fragment.lower, exit, down_fold, true);
        for node in &fragment.interior {
            graph.set_hidden(*node, true);
        }
        graph.set_hidden(edge_node, false);
        graph.folds.insert(
            edge_node,
            FoldRecord {
                upper: fragment.upper,
                lower: fragment.lower,
                interior: fragment.interior.clone(),
                entry_edge: entry,
                exit_edge: exit,
                fold_edges: [up_fold, down_fold],
            },
        );

        let last_row = first_row + fragment.interior.len();
        let update = graph.splice_rows(first_row, last_row, &[edge_node]);
        debug!(
            %edge_node,
            hidden = fragment.interior.len(),
            replace = ?update.replace,
            "fragment collapsed"
        );
        Ok(update)
    }

    /// Expand a collapsed fragment back into its commits
    pub fn show_fragment(&self, graph: &mut Graph, fragment: &Fragment) -> Result<UpdateRequest> {
        let edge_node = fragment.collapsed.ok_or_else(|| {
            GraphError::InvalidFragmentState("fragment is not collapsed".to_string())
        })?;
        let record = graph.fold(edge_node).cloned().ok_or_else(|| {
            GraphError::InvalidFragmentState(format!("{} holds no collapsed fragment", edge_node))
        })?;
        if record.interior != fragment.interior {
            return Err(GraphError::StaleFragment {
                upper: fragment.upper,
                lower: fragment.lower,
            });
        }
        let row = graph.row_of(edge_node).ok_or_else(|| {
            GraphError::InvalidFragmentState(format!("{} is not on screen", edge_node))
        })?;

        let [up_fold, down_fold] = record.fold_edges;
        graph.swap_edge(record.upper, up_fold, record.entry_edge, false);
        graph.swap_edge(record.lower, down_fold, record.exit_edge, true);
        for node in &record.interior {
            graph.set_hidden(*node, false);
        }
        graph.set_hidden(edge_node, true);
        graph.folds.remove(&edge_node);

        let update = graph.splice_rows(row, row + 1, &record.interior);
        graph.free_edge(up_fold);
        graph.free_edge(down_fold);
        graph.remove_synthetic_node(edge_node);

        debug!(
            %edge_node,
            restored = record.interior.len(),
            replace = ?update.replace,
            "fragment expanded"
        );
        Ok(update)
    }

    /// Expand every collapsed fragment; updates must be applied in order
    pub fn show_all(&self, graph: &mut Graph) -> Result<Vec<UpdateRequest>> {
        let fragments = self.hidden_fragments(graph);
        let mut updates = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            updates.push(self.show_fragment(graph, fragment)?);
        }
        Ok(updates)
    }
}
