//! Flat file cache keyed by numeric codes
//!
//! Stores one blob per key as `<key>.jpg` directly inside a single
//! directory. Writes replace entries atomically so a reader never sees a
//! partially written file.

mod cache;
mod error;
mod types;

pub use cache::FileCache;
pub use error::{CacheError, Result};
pub use types::ResourceKey;
