use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, trace};

use super::cell::{GraphPrintCell, LongEdgePolicy};
use crate::cache::RowCache;
use crate::config::GraphConfig;
use crate::core::{EdgeId, Graph};
use crate::error::{GraphError, Result};
use crate::layout::LaneLayout;
use crate::list::UpdateRequest;
use crate::model::UpdateListener;

/// Lazily computed, cached print cells for every visible row
#[derive(Debug, Clone)]
pub struct GraphPrintCellModel {
    layout: LaneLayout,
    cache: RowCache<Arc<GraphPrintCell>>,
    policy: LongEdgePolicy,
    /// Graph generation the layout and cache reflect
    generation: u64,
}

impl GraphPrintCellModel {
    pub fn new(graph: &Graph, config: &GraphConfig) -> Self {
        Self {
            layout: LaneLayout::new(graph, config.compression_step),
            cache: RowCache::new(config.cache_capacity),
            policy: LongEdgePolicy {
                hidden: config.hide_long_edges,
                length: config.long_edge_length,
                visible_part: config.long_edge_visible_part.max(1),
            },
            generation: graph.generation(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.layout.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get_graph_print_cell(
        &mut self,
        graph: &Graph,
        row: usize,
    ) -> Result<Arc<GraphPrintCell>> {
        if self.generation != graph.generation() {
            return Err(GraphError::StaleGeneration {
                model: self.generation,
                graph: graph.generation(),
            });
        }
        let count = self.layout.len();
        if row >= count {
            return Err(GraphError::RowOutOfRange { row, count });
        }

        let layout = &self.layout;
        let policy = &self.policy;
        self.cache.get_or_try_insert_with(row, || {
            trace!(row, "computing print cell");
            let (above, here) = layout
                .around(graph, row)
                .ok_or(GraphError::RowOutOfRange { row, count })?;
            Ok(Arc::new(GraphPrintCell::build(graph, row, &above, &here, policy)))
        })
    }

    /// Apply a structural update; `graph` must already be in the new state.
    pub fn recalculate(&mut self, graph: &Graph, update: &UpdateRequest) {
        let replace = update.replace;
        let changed = self.layout.recalculate(graph, replace);
        self.cache.apply(&replace);

        // a cell reads the lane rows of its own row and the one above
        let row_count = self.layout.len();
        let start = changed.start.min(replace.from.saturating_sub(1));
        let end = (changed.end + 1).max(replace.from + replace.new_count + 1).min(row_count);
        self.cache.invalidate(start..end);

        if self.policy.hidden {
            for edge in self.crossing_edges(graph, replace.from, replace.new_count) {
                let Some((up_row, down_row)) = graph.edge_rows(edge) else {
                    continue;
                };
                // long-edge status may have flipped along with the span length
                let span = down_row - up_row;
                if span + replace.delta().unsigned_abs() >= self.policy.length {
                    self.cache.invalidate(up_row..down_row + 1);
                }
            }
        }

        self.generation = update.generation;
        debug!(?replace, ?changed, generation = self.generation, "print cells recalculated");
    }

    /// Edges crossing the upper or lower boundary of `[from, from + count)`
    fn crossing_edges(&self, graph: &Graph, from: usize, count: usize) -> BTreeSet<EdgeId> {
        let mut edges = BTreeSet::new();
        let mut probe = Vec::with_capacity(2);
        if from > 0 {
            probe.push(from - 1);
        }
        if count > 0 {
            probe.push(from + count - 1);
        }
        for row in probe {
            if let Some(lanes) = self.layout.row(graph, row) {
                edges.extend(lanes.edges().map(|(_, edge)| edge));
            }
        }
        edges
    }

    /// Toggle drawing of long edges. Pure rendering change: rows stay put.
    pub fn set_long_edge_visibility(&mut self, visible: bool) {
        if self.policy.hidden == !visible {
            return;
        }
        self.policy.hidden = !visible;
        self.cache.clear();
        debug!(visible, "long edge visibility changed");
    }

    pub fn are_long_edges_hidden(&self) -> bool {
        self.policy.hidden
    }

    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.stats()
    }
}

impl UpdateListener for GraphPrintCellModel {
    fn on_update(&mut self, graph: &Graph, update: &UpdateRequest) {
        self.recalculate(graph, update);
    }
}
