use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::RowCache;
use crate::config::GraphConfig;
use crate::core::{CommitRecord, Graph, GraphElement};
use crate::error::Result;
use crate::fragment::{Fragment, GraphFragmentController};
use crate::list::{Replace, UpdateRequest};
use crate::print::{GraphPrintCell, GraphPrintCellModel};
use crate::select::SelectController;

/// Anything holding row-indexed state derived from the graph.
///
/// Called after the graph has reached the new state, once per update and in
/// the order the updates were produced.
pub trait UpdateListener {
    fn on_update(&mut self, graph: &Graph, update: &UpdateRequest);
}

impl<V: Clone> UpdateListener for RowCache<V> {
    fn on_update(&mut self, _graph: &Graph, update: &UpdateRequest) {
        self.apply(&update.replace);
    }
}

/// The foldable graph view: graph, fragment commands, print cells and
/// selection kept in step with each other
pub struct GraphModel {
    graph: Graph,
    fragments: GraphFragmentController,
    print_cells: GraphPrintCellModel,
    selection: SelectController,
    listeners: Vec<Box<dyn UpdateListener>>,
}

impl GraphModel {
    pub fn new(graph: Graph, config: &GraphConfig) -> Self {
        let print_cells = GraphPrintCellModel::new(&graph, config);
        Self {
            graph,
            fragments: GraphFragmentController::new(config.min_fragment_size),
            print_cells,
            selection: SelectController::new(),
            listeners: Vec::new(),
        }
    }

    pub fn from_commits(commits: Vec<CommitRecord>, config: &GraphConfig) -> Result<Self> {
        let graph = Graph::from_commits(commits)?;
        info!(
            rows = graph.row_count(),
            branches = graph.branch_count(),
            "graph model built"
        );
        Ok(Self::new(graph, config))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn row_count(&self) -> usize {
        self.graph.row_count()
    }

    /// Commit shown on `row`; `None` for edge nodes and dangling parents
    pub fn commit_at(&self, row: usize) -> Option<&CommitRecord> {
        let node = self.graph.node_at(row).ok()?;
        self.graph.commit(node)
    }

    pub fn relate_fragment(&self, element: GraphElement) -> Option<Fragment> {
        self.fragments.relate_fragment(&self.graph, element)
    }

    pub fn hidden_fragments(&self) -> Vec<Fragment> {
        self.fragments.hidden_fragments(&self.graph)
    }

    pub fn hide_fragment(&mut self, fragment: &Fragment) -> Result<Replace> {
        let update = self.fragments.hide_fragment(&mut self.graph, fragment)?;
        self.dispatch(&update);
        Ok(update.replace)
    }

    pub fn show_fragment(&mut self, fragment: &Fragment) -> Result<Replace> {
        let update = self.fragments.show_fragment(&mut self.graph, fragment)?;
        self.dispatch(&update);
        Ok(update.replace)
    }

    pub fn show_all(&mut self) -> Result<Vec<Replace>> {
        let mut replaces = Vec::new();
        for fragment in self.hidden_fragments() {
            replaces.push(self.show_fragment(&fragment)?);
        }
        Ok(replaces)
    }

    /// Fold or unfold whatever the clicked element belongs to
    pub fn toggle(&mut self, element: GraphElement) -> Result<Option<Replace>> {
        let Some(fragment) = self.relate_fragment(element) else {
            debug!(?element, "nothing to fold");
            return Ok(None);
        };
        let replace = if fragment.is_collapsed() {
            self.show_fragment(&fragment)?
        } else {
            self.hide_fragment(&fragment)?
        };
        Ok(Some(replace))
    }

    pub fn get_graph_print_cell(&mut self, row: usize) -> Result<Arc<GraphPrintCell>> {
        self.print_cells.get_graph_print_cell(&self.graph, row)
    }

    pub fn set_long_edge_visibility(&mut self, visible: bool) {
        self.print_cells.set_long_edge_visibility(visible);
    }

    pub fn are_long_edges_hidden(&self) -> bool {
        self.print_cells.are_long_edges_hidden()
    }

    pub fn print_cells(&self) -> &GraphPrintCellModel {
        &self.print_cells
    }

    pub fn selection(&self) -> &SelectController {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectController {
        &mut self.selection
    }

    /// Register extra row-indexed state to keep in step with the graph
    pub fn subscribe(&mut self, listener: Box<dyn UpdateListener>) {
        self.listeners.push(listener);
    }

    fn dispatch(&mut self, update: &UpdateRequest) {
        self.print_cells.on_update(&self.graph, update);
        self.selection.on_update(&self.graph, update);
        for listener in &mut self.listeners {
            listener.on_update(&self.graph, update);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn chain_model() -> GraphModel {
        let commits = vec![
            CommitRecord::bare("A", &["B"]),
            CommitRecord::bare("B", &["C"]),
            CommitRecord::bare("C", &["D"]),
            CommitRecord::bare("D", &["E"]),
            CommitRecord::bare("E", &[]),
        ];
        GraphModel::from_commits(commits, &GraphConfig::default()).unwrap()
    }

    struct Recorder(Rc<RefCell<Vec<Replace>>>);

    impl UpdateListener for Recorder {
        fn on_update(&mut self, _graph: &Graph, update: &UpdateRequest) {
            self.0.borrow_mut().push(update.replace);
        }
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut model = chain_model();
        let seen = Rc::new(RefCell::new(Vec::new()));
        model.subscribe(Box::new(Recorder(seen.clone())));
        let c = model.graph().find("C").unwrap();

        let hide = model.toggle(c.into()).unwrap();
        assert_eq!(hide, Some(Replace::new(1, 4, 1)));
        assert_eq!(model.row_count(), 3);
        assert!(model.get_graph_print_cell(2).is_ok());
        assert_eq!(model.commit_at(1), None);

        let edge_node = model.graph().node_at(1).unwrap();
        let show = model.toggle(edge_node.into()).unwrap();
        assert_eq!(show, Some(Replace::new(1, 2, 3)));
        assert_eq!(model.row_count(), 5);
        assert_eq!(model.commit_at(2).map(|c| c.hash.as_str()), Some("C"));

        assert_eq!(*seen.borrow(), vec![Replace::new(1, 4, 1), Replace::new(1, 2, 3)]);
    }

    #[test]
    fn test_toggle_on_unfoldable_element() {
        let mut model = chain_model();
        let a = model.graph().find("A").unwrap();
        let generation = model.graph().generation();

        assert_eq!(model.toggle(a.into()).unwrap(), None);
        assert_eq!(model.graph().generation(), generation);
    }

    #[test]
    fn test_long_edge_toggle_emits_nothing() {
        let mut model = chain_model();
        let seen = Rc::new(RefCell::new(Vec::new()));
        model.subscribe(Box::new(Recorder(seen.clone())));

        model.set_long_edge_visibility(true);
        model.set_long_edge_visibility(false);
        assert!(seen.borrow().is_empty());
        assert!(model.are_long_edges_hidden());
    }

    #[test]
    fn test_selection_follows_folds() {
        let mut model = chain_model();
        let b = model.graph().find("B").unwrap();
        let e = model.graph().find("E").unwrap();
        model.selection_mut().select(b.into());
        model.selection_mut().select(e.into());
        model.selection_mut().highlight_row(4, true);

        model.toggle(b.into()).unwrap();
        assert!(!model.selection().is_select(b.into()));
        assert!(model.selection().is_select(e.into()));
        assert!(model.selection().is_row_highlighted(2));
    }

    #[test]
    fn test_show_all_and_stale_hide() {
        let mut model = chain_model();
        let fragment = model
            .relate_fragment(model.graph().find("B").unwrap().into())
            .unwrap();
        model.hide_fragment(&fragment).unwrap();
        assert!(matches!(
            model.hide_fragment(&fragment),
            Err(GraphError::InvalidFragmentState(_))
        ));

        assert_eq!(model.show_all().unwrap(), vec![Replace::new(1, 2, 3)]);
        assert!(model.hidden_fragments().is_empty());
    }

    #[test]
    fn test_row_cache_listener() {
        let mut model = chain_model();
        let mut cache: RowCache<&'static str> = RowCache::new(8);
        cache.insert(0, "A");
        cache.insert(4, "E");

        let fragment = model
            .relate_fragment(model.graph().find("C").unwrap().into())
            .unwrap();
        let update = model.fragments.hide_fragment(&mut model.graph, &fragment).unwrap();
        cache.on_update(&model.graph, &update);

        assert_eq!(cache.get(0), Some("A"));
        assert_eq!(cache.get(2), Some("E"));
        assert_eq!(cache.get(4), None);
    }
}
