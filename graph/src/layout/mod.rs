pub mod lanes;

pub use lanes::{LaneGenerator, LaneIdx, LaneLayout, LaneRow};
