//! Result caching.
//!
//! - **Keys**: deterministic, mode-tagged, separator-joined parameter tuples
//! - **Store**: a map shared by all sessions with a per-key computation guard
//!   and an optional FIFO capacity

pub mod key;
pub mod store;

pub use key::{CacheKey, SEGMENT_SEPARATOR};
pub use store::{CacheStats, Cached, ResultCache};
