pub mod compressed;
pub mod replace;

pub use compressed::{CompressedList, Generator};
pub use replace::{Replace, UpdateRequest};
