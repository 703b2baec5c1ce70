pub mod row_cache;
pub mod slru;

pub use row_cache::RowCache;
pub use slru::SlruCache;
