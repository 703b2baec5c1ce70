//! Foldable commit graph: an arena graph of commits, fragment folding with
//! incremental row updates, and the lane/print cell model drawn from it.

pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod fragment;
pub mod git_backend;
pub mod layout;
pub mod list;
pub mod model;
pub mod print;
pub mod render;
pub mod select;

pub use config::GraphConfig;
pub use core::{CommitRecord, EdgeId, EdgeKind, Graph, GraphElement, NodeId, NodeType};
pub use error::{GraphError, Result};
pub use fragment::{Fragment, GraphFragmentController, MIN_FRAGMENT_SIZE};
pub use git_backend::GitWalker;
pub use list::{Replace, UpdateRequest};
pub use model::{GraphModel, UpdateListener};
pub use print::{GraphPrintCell, GraphPrintCellModel, PrintElement};
pub use render::AsciiRenderer;
pub use select::SelectController;
