use std::collections::BTreeSet;

use tracing::trace;

use crate::core::{Graph, GraphElement};
use crate::list::UpdateRequest;
use crate::model::UpdateListener;

/// Selection, hover and row highlight state of the graph view.
///
/// Element selection is keyed by handle and survives folds as long as the
/// element stays on screen. Highlights are keyed by row and move with the
/// rows they were set on.
#[derive(Debug, Clone, Default)]
pub struct SelectController {
    selected: BTreeSet<GraphElement>,
    hovered: Option<GraphElement>,
    highlighted_rows: BTreeSet<usize>,
}

impl SelectController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, element: GraphElement) {
        self.selected.insert(element);
    }

    pub fn un_select(&mut self, element: GraphElement) {
        self.selected.remove(&element);
    }

    pub fn is_select(&self, element: GraphElement) -> bool {
        self.selected.contains(&element)
    }

    pub fn selected(&self) -> impl Iterator<Item = GraphElement> + '_ {
        self.selected.iter().copied()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn hover(&mut self, element: Option<GraphElement>) {
        self.hovered = element;
    }

    pub fn hovered(&self) -> Option<GraphElement> {
        self.hovered
    }

    pub fn highlight_row(&mut self, row: usize, on: bool) {
        if on {
            self.highlighted_rows.insert(row);
        } else {
            self.highlighted_rows.remove(&row);
        }
    }

    pub fn is_row_highlighted(&self, row: usize) -> bool {
        self.highlighted_rows.contains(&row)
    }

    pub fn highlighted_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.highlighted_rows.iter().copied()
    }
}

impl UpdateListener for SelectController {
    fn on_update(&mut self, graph: &Graph, update: &UpdateRequest) {
        let before = self.selected.len();
        self.selected.retain(|element| graph.is_addressable(*element));
        if self.hovered.is_some_and(|element| !graph.is_addressable(element)) {
            self.hovered = None;
        }

        let replace = update.replace;
        self.highlighted_rows = self
            .highlighted_rows
            .iter()
            .filter_map(|row| replace.map_row(*row))
            .collect();

        trace!(
            dropped = before - self.selected.len(),
            highlighted = self.highlighted_rows.len(),
            "selection updated"
        );
    }
}
