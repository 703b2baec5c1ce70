use crate::core::{EdgeKind, NodeId, NodeType};
use crate::error::Result;
use crate::model::GraphModel;
use crate::print::{ArrowDirection, EdgePart, GraphPrintCell, PrintElement};

use super::text::truncate_to_width;

/// Characters used for the graph column
pub mod chars {
    pub const COMMIT: char = '*';
    pub const EDGE_NODE: char = '~';
    pub const END_COMMIT: char = 'o';
    pub const VERTICAL: char = '|';
    pub const FOLDED: char = ':';
    pub const HORIZONTAL: char = '-';
    /// Edge leaving the node towards another lane
    pub const FORK: char = '.';
    /// Edge arriving at the node from another lane
    pub const MERGE: char = '\'';
    pub const ARROW_UP: char = '^';
    pub const ARROW_DOWN: char = 'v';
    pub const SELECTED: char = '>';
    pub const SPACE: char = ' ';
}

/// Plain text dump of the graph, one line per visible row.
///
/// Lanes take two columns each. Selected or highlighted rows are marked in
/// the first column.
#[derive(Debug, Clone)]
pub struct AsciiRenderer {
    text_width: usize,
}

impl AsciiRenderer {
    pub fn new(text_width: usize) -> Self {
        Self { text_width }
    }

    /// Graph column of one cell, `lanes` lanes wide
    pub fn render_cell(&self, cell: &GraphPrintCell, lanes: usize) -> String {
        let lanes = lanes.max(cell.width()).max(1);
        let mut cols = vec![chars::SPACE; lanes * 2 - 1];
        let node_col = cell.node_lane() * 2;

        for element in cell.elements() {
            match element {
                PrintElement::Edge {
                    part: EdgePart::Through,
                    up_lane,
                    kind,
                    ..
                } => {
                    cols[up_lane * 2] = match kind {
                        EdgeKind::Usual => chars::VERTICAL,
                        EdgeKind::Fold => chars::FOLDED,
                    };
                }
                PrintElement::Arrow { lane, direction, .. } => {
                    cols[lane * 2] = match direction {
                        ArrowDirection::Up => chars::ARROW_UP,
                        ArrowDirection::Down => chars::ARROW_DOWN,
                    };
                }
                _ => {}
            }
        }

        for element in cell.elements() {
            let (lane, corner) = match element {
                PrintElement::Edge {
                    part: EdgePart::Upper,
                    up_lane,
                    ..
                } => (*up_lane, chars::MERGE),
                PrintElement::Edge {
                    part: EdgePart::Lower,
                    down_lane,
                    ..
                } => (*down_lane, chars::FORK),
                _ => continue,
            };
            let col = lane * 2;
            if col == node_col {
                continue;
            }
            let (start, end) = if col < node_col {
                (col + 1, node_col)
            } else {
                (node_col + 1, col)
            };
            for slot in &mut cols[start..end] {
                if *slot == chars::SPACE {
                    *slot = chars::HORIZONTAL;
                }
            }
            if matches!(cols[col], chars::SPACE | chars::HORIZONTAL) {
                cols[col] = corner;
            }
        }

        for element in cell.elements() {
            if let PrintElement::Node { lane, node_type, .. } = element {
                cols[lane * 2] = match node_type {
                    NodeType::Commit => chars::COMMIT,
                    NodeType::EdgeNode => chars::EDGE_NODE,
                    NodeType::EndCommit => chars::END_COMMIT,
                };
            }
        }

        cols.into_iter().collect()
    }

    /// Description printed next to the graph column
    fn describe(&self, model: &GraphModel, node: NodeId) -> String {
        let graph = model.graph();
        let n = graph.node(node);
        let text = match n.node_type {
            NodeType::Commit => match graph.commit(node) {
                Some(commit) if !commit.subject.is_empty() => {
                    format!("{} {}", n.short_hash(), commit.subject)
                }
                _ => n.short_hash().to_string(),
            },
            NodeType::EdgeNode => {
                let hidden = graph.fold(node).map_or(0, |record| record.interior.len());
                format!("{} hidden commits", hidden)
            }
            NodeType::EndCommit => format!("{} (not loaded)", n.short_hash()),
        };
        truncate_to_width(&text, self.text_width)
    }

    pub fn render_row(&self, model: &mut GraphModel, row: usize, lanes: usize) -> Result<String> {
        let cell = model.get_graph_print_cell(row)?;
        let selection = model.selection();
        let marked = selection.is_row_highlighted(row) || selection.is_select(cell.node().into());
        let marker = if marked { chars::SELECTED } else { chars::SPACE };

        let line = format!(
            "{}{} {}",
            marker,
            self.render_cell(&cell, lanes),
            self.describe(model, cell.node())
        );
        Ok(line.trim_end().to_string())
    }

    /// Every visible row, graph columns aligned to the widest row
    pub fn render(&self, model: &mut GraphModel) -> Result<String> {
        let mut lanes = 1;
        for row in 0..model.row_count() {
            lanes = lanes.max(model.get_graph_print_cell(row)?.width());
        }

        let mut buffer = String::new();
        for row in 0..model.row_count() {
            buffer.push_str(&self.render_row(model, row, lanes)?);
            buffer.push('\n');
        }
        Ok(buffer)
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new(72)
    }
}
