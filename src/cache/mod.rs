//! Rewrite response caching over the shared store.

pub mod response_cache;

pub use response_cache::{ResponseCache, DEFAULT_CACHE_TTL_SECS};
