pub mod ascii;
pub mod text;

pub use ascii::{chars, AsciiRenderer};
pub use text::{display_width, truncate_to_width};
