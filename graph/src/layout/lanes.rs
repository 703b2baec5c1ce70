use smallvec::SmallVec;

use crate::core::{EdgeId, Graph, NodeId, RowRange};
use crate::list::{CompressedList, Generator, Replace};

/// A lane represents a vertical column in the graph
pub type LaneIdx = usize;

/// Lane occupancy right below one row.
///
/// `lanes[i]` is the edge running down through lane `i` from this row (or
/// above) to some row further down.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaneRow {
    /// Lane of the node printed on this row
    pub node_lane: LaneIdx,
    pub lanes: SmallVec<[Option<EdgeId>; 8]>,
}

impl LaneRow {
    pub fn lane_of(&self, edge: EdgeId) -> Option<LaneIdx> {
        self.lanes.iter().position(|slot| *slot == Some(edge))
    }

    /// Edges crossing the boundary below this row, by lane
    pub fn edges(&self) -> impl Iterator<Item = (LaneIdx, EdgeId)> + '_ {
        self.lanes
            .iter()
            .enumerate()
            .filter_map(|(lane, slot)| slot.map(|edge| (lane, edge)))
    }

    pub fn width(&self) -> usize {
        self.lanes.len().max(self.node_lane + 1)
    }

    fn lowest_free(&self) -> LaneIdx {
        self.lanes
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.lanes.len())
    }

    fn occupy(&mut self, lane: LaneIdx, edge: EdgeId) {
        if lane == self.lanes.len() {
            self.lanes.push(Some(edge));
        } else {
            self.lanes[lane] = Some(edge);
        }
    }

    fn trim(&mut self) {
        while let Some(None) = self.lanes.last() {
            self.lanes.pop();
        }
    }
}

/// Derives the lane row of row `r` from the lane row of `r - 1`.
///
/// Edges ending on the row's node release their lanes first, the node takes
/// the lowest free lane, and the node's parent edges then take the lowest
/// free lanes one by one, ordered by branch registration and then by parse
/// order. An edge keeps its lane until it ends.
pub struct LaneGenerator<'g> {
    graph: &'g Graph,
}

impl<'g> LaneGenerator<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    fn lay_out(&self, above: &LaneRow, node: NodeId) -> LaneRow {
        let mut row = LaneRow {
            node_lane: 0,
            lanes: above.lanes.clone(),
        };
        for slot in row.lanes.iter_mut() {
            if let Some(edge) = slot {
                if self.graph.edge(*edge).down == node {
                    *slot = None;
                }
            }
        }
        row.node_lane = row.lowest_free();

        let mut starting: SmallVec<[EdgeId; 4]> =
            self.graph.parents(node).iter().copied().collect();
        // stable: parse order breaks ties within a branch
        starting.sort_by_key(|edge| self.graph.edge(*edge).branch);
        for edge in starting {
            let lane = row.lowest_free();
            row.occupy(lane, edge);
        }
        row.trim();
        row
    }
}

impl Generator<LaneRow> for LaneGenerator<'_> {
    fn generate_first(&self) -> LaneRow {
        self.lay_out(&LaneRow::default(), self.graph.visible_nodes()[0])
    }

    fn generate(&self, prev: &LaneRow, prev_index: usize) -> LaneRow {
        self.lay_out(prev, self.graph.visible_nodes()[prev_index + 1])
    }
}

/// Lane rows for every visible row, kept in a [`CompressedList`]
#[derive(Debug, Clone)]
pub struct LaneLayout {
    rows: CompressedList<LaneRow>,
}

impl LaneLayout {
    pub fn new(graph: &Graph, step: usize) -> Self {
        Self {
            rows: CompressedList::new(graph.row_count(), step, &LaneGenerator::new(graph)),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, graph: &Graph, row: usize) -> Option<LaneRow> {
        self.rows.get(row, &LaneGenerator::new(graph))
    }

    /// Lane rows of `row - 1` and `row`; the first is empty on row 0
    pub fn around(&self, graph: &Graph, row: usize) -> Option<(LaneRow, LaneRow)> {
        let generator = LaneGenerator::new(graph);
        if row == 0 {
            let here = self.rows.get(0, &generator)?;
            return Some((LaneRow::default(), here));
        }
        let above = self.rows.get(row - 1, &generator)?;
        if row >= self.rows.len() {
            return None;
        }
        let here = generator.generate(&above, row - 1);
        Some((above, here))
    }

    /// Apply an edit; returns the rows whose lane rows may have changed.
    ///
    /// Edges reaching into the new rows from above change identity along
    /// with them, so the range starts at the topmost row such an edge leaves.
    pub fn recalculate(&mut self, graph: &Graph, replace: Replace) -> RowRange {
        let mut start = replace.from;
        for row in replace.new_range() {
            let Ok(node) = graph.node_at(row) else {
                continue;
            };
            for edge in graph.children(node) {
                if let Some(up_row) = graph.row_of(graph.edge(*edge).up) {
                    start = start.min(up_row);
                }
            }
        }
        let settled = self
            .rows
            .recalculate_from(start, replace, &LaneGenerator::new(graph));
        start..settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommitRecord;
    use pretty_assertions::assert_eq;

    fn graph_of(commits: &[(&str, &[&str])]) -> Graph {
        Graph::from_commits(
            commits
                .iter()
                .map(|(hash, parents)| CommitRecord::bare(*hash, parents))
                .collect(),
        )
        .unwrap()
    }

    fn node_lanes(graph: &Graph, layout: &LaneLayout) -> Vec<LaneIdx> {
        (0..layout.len())
            .map(|row| layout.row(graph, row).unwrap().node_lane)
            .collect()
    }

    #[test]
    fn test_linear_history_stays_in_lane_zero() {
        let graph = graph_of(&[("c", &["b"]), ("b", &["a"]), ("a", &[])]);
        let layout = LaneLayout::new(&graph, 2);

        assert_eq!(node_lanes(&graph, &layout), vec![0, 0, 0]);
        assert!(layout.row(&graph, 2).unwrap().lanes.is_empty());
    }

    #[test]
    fn test_diamond_lanes() {
        let graph = graph_of(&[
            ("A", &["B", "C"]),
            ("B", &["D"]),
            ("C", &["D"]),
            ("D", &[]),
        ]);
        let layout = LaneLayout::new(&graph, 4);
        let a = graph.find("A").unwrap();
        let c = graph.find("C").unwrap();

        assert_eq!(node_lanes(&graph, &layout), vec![0, 0, 1, 0]);

        let top = layout.row(&graph, 0).unwrap();
        assert_eq!(top.lane_of(graph.parents(a)[0]), Some(0));
        assert_eq!(top.lane_of(graph.parents(a)[1]), Some(1));

        let third = layout.row(&graph, 2).unwrap();
        assert_eq!(third.lane_of(graph.parents(c)[0]), Some(1));
        assert_eq!(third.width(), 2);
    }

    #[test]
    fn test_earlier_branch_gets_lower_lane() {
        // M's second parent belongs to a branch registered before the first parent's
        let graph = graph_of(&[
            ("X", &["F"]),
            ("M", &["P", "F"]),
            ("F", &["P"]),
            ("P", &[]),
        ]);
        let layout = LaneLayout::new(&graph, 8);
        let m = graph.find("M").unwrap();
        let row = layout.row(&graph, 1).unwrap();

        // the edge X -> F still holds lane 0, so M lands on lane 1
        assert_eq!(row.node_lane, 1);
        // F's branch (registered by X) outranks M's own branch
        assert_eq!(row.lane_of(graph.parents(m)[1]), Some(1));
        assert_eq!(row.lane_of(graph.parents(m)[0]), Some(2));
    }

    #[test]
    fn test_around_matches_rows() {
        let graph = graph_of(&[("B", &["A"]), ("A", &[])]);
        let layout = LaneLayout::new(&graph, 1);
        let (above, here) = layout.around(&graph, 1).unwrap();

        assert_eq!(above, layout.row(&graph, 0).unwrap());
        assert_eq!(here, layout.row(&graph, 1).unwrap());
        assert!(layout.around(&graph, 2).is_none());
    }
}
