use thiserror::Error;

use crate::core::NodeId;

/// Errors raised by the graph core.
///
/// Every variant points at a caller bug or at malformed commit input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// hide/show called against a fragment whose visibility doesn't match
    #[error("invalid fragment state: {0}")]
    InvalidFragmentState(String),

    /// The fragment was computed against a graph shape that no longer exists
    #[error("fragment between {upper} and {lower} is stale")]
    StaleFragment { upper: NodeId, lower: NodeId },

    #[error("row {row} is out of range (row count {count})")]
    RowOutOfRange { row: usize, count: usize },

    /// A row query arrived before the latest update was applied
    #[error("stale generation: model at {model}, graph at {graph}")]
    StaleGeneration { model: u64, graph: u64 },

    #[error("commit {0} appears more than once")]
    DuplicateCommit(String),

    #[error("commit {child} lists parent {parent} above itself")]
    ParentAboveChild { child: String, parent: String },
}

pub type Result<T> = std::result::Result<T, GraphError>;
