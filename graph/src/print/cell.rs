use crate::core::{EdgeId, EdgeKind, Graph, GraphElement, NodeId, NodeType};
use crate::layout::{LaneIdx, LaneRow};

/// Which half of the row an edge segment covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgePart {
    /// From the top of the row into the node
    Upper,
    /// From the node to the bottom of the row
    Lower,
    /// Straight through the whole row
    Through,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowDirection {
    Up,
    Down,
}

/// One drawable piece of a row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrintElement {
    Node {
        node: NodeId,
        lane: LaneIdx,
        node_type: NodeType,
    },
    Edge {
        edge: EdgeId,
        part: EdgePart,
        up_lane: LaneIdx,
        down_lane: LaneIdx,
        kind: EdgeKind,
    },
    /// Marks where a hidden long edge stops being drawn
    Arrow {
        edge: EdgeId,
        lane: LaneIdx,
        direction: ArrowDirection,
    },
}

impl PrintElement {
    pub fn element(&self) -> GraphElement {
        match self {
            PrintElement::Node { node, .. } => GraphElement::Node(*node),
            PrintElement::Edge { edge, .. } | PrintElement::Arrow { edge, .. } => {
                GraphElement::Edge(*edge)
            }
        }
    }

    fn max_lane(&self) -> LaneIdx {
        match self {
            PrintElement::Node { lane, .. } | PrintElement::Arrow { lane, .. } => *lane,
            PrintElement::Edge { up_lane, down_lane, .. } => (*up_lane).max(*down_lane),
        }
    }
}

/// How edges spanning many rows are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongEdgePolicy {
    pub hidden: bool,
    pub length: usize,
    pub visible_part: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    Drawn,
    Arrow(ArrowDirection),
    Skipped,
}

impl LongEdgePolicy {
    pub fn is_long(&self, up_row: usize, down_row: usize) -> bool {
        down_row - up_row >= self.length
    }

    pub(crate) fn visibility(&self, up_row: usize, down_row: usize, row: usize) -> Visibility {
        if !self.hidden || !self.is_long(up_row, down_row) {
            return Visibility::Drawn;
        }
        let from_top = row - up_row;
        let from_bottom = down_row - row;
        if from_top < self.visible_part || from_bottom < self.visible_part {
            Visibility::Drawn
        } else if from_top == self.visible_part {
            Visibility::Arrow(ArrowDirection::Down)
        } else if from_bottom == self.visible_part {
            Visibility::Arrow(ArrowDirection::Up)
        } else {
            Visibility::Skipped
        }
    }
}

/// Everything needed to draw the graph column of one row.
///
/// Built from graph state at one generation and never modified afterwards.
/// Holds no row number, so a cached cell stays valid when its row shifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPrintCell {
    node: NodeId,
    elements: Vec<PrintElement>,
}

impl GraphPrintCell {
    pub(crate) fn build(
        graph: &Graph,
        row: usize,
        above: &LaneRow,
        here: &LaneRow,
        policy: &LongEdgePolicy,
    ) -> Self {
        let node = graph.visible_nodes()[row];
        let mut elements = Vec::new();

        for (lane, edge) in above.edges() {
            let e = graph.edge(edge);
            if e.down == node {
                elements.push(PrintElement::Edge {
                    edge,
                    part: EdgePart::Upper,
                    up_lane: lane,
                    down_lane: here.node_lane,
                    kind: e.kind,
                });
                continue;
            }
            let Some((up_row, down_row)) = graph.edge_rows(edge) else {
                continue;
            };
            match policy.visibility(up_row, down_row, row) {
                Visibility::Drawn => elements.push(PrintElement::Edge {
                    edge,
                    part: EdgePart::Through,
                    up_lane: lane,
                    down_lane: lane,
                    kind: e.kind,
                }),
                Visibility::Arrow(direction) => elements.push(PrintElement::Arrow {
                    edge,
                    lane,
                    direction,
                }),
                Visibility::Skipped => {}
            }
        }

        elements.push(PrintElement::Node {
            node,
            lane: here.node_lane,
            node_type: graph.node(node).node_type,
        });

        for (lane, edge) in here.edges() {
            let e = graph.edge(edge);
            if e.up == node {
                elements.push(PrintElement::Edge {
                    edge,
                    part: EdgePart::Lower,
                    up_lane: here.node_lane,
                    down_lane: lane,
                    kind: e.kind,
                });
            }
        }

        Self { node, elements }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn node_lane(&self) -> LaneIdx {
        self.elements
            .iter()
            .find_map(|el| match el {
                PrintElement::Node { lane, .. } => Some(*lane),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn elements(&self) -> &[PrintElement] {
        &self.elements
    }

    /// Number of lanes touched by this row
    pub fn width(&self) -> usize {
        self.elements.iter().map(|el| el.max_lane() + 1).max().unwrap_or(0)
    }

    pub fn has_long_edge_marker(&self) -> bool {
        self.elements
            .iter()
            .any(|el| matches!(el, PrintElement::Arrow { .. }))
    }

    pub fn contains(&self, element: GraphElement) -> bool {
        self.elements.iter().any(|el| el.element() == element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_edge_visibility() {
        let policy = LongEdgePolicy {
            hidden: true,
            length: 10,
            visible_part: 1,
        };

        assert_eq!(policy.visibility(0, 20, 0), Visibility::Drawn);
        assert_eq!(policy.visibility(0, 20, 1), Visibility::Arrow(ArrowDirection::Down));
        assert_eq!(policy.visibility(0, 20, 10), Visibility::Skipped);
        assert_eq!(policy.visibility(0, 20, 19), Visibility::Arrow(ArrowDirection::Up));
        assert_eq!(policy.visibility(0, 20, 20), Visibility::Drawn);
        // short edges always draw
        assert_eq!(policy.visibility(0, 5, 3), Visibility::Drawn);

        let shown = LongEdgePolicy { hidden: false, ..policy };
        assert_eq!(shown.visibility(0, 20, 10), Visibility::Drawn);
    }
}
