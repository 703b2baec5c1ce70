pub mod cell;
pub mod model;

pub use cell::{ArrowDirection, EdgePart, GraphPrintCell, LongEdgePolicy, PrintElement};
pub use model::GraphPrintCellModel;
