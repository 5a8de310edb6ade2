//! Shared key-value store abstraction.
//!
//! The cache and the undo/redo history only need a handful of string and
//! list primitives. [`RedisStore`] is the production backend; [`MemoryStore`]
//! mirrors the same semantics in-process for tests and single-node runs.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// String and list primitives over a shared store.
///
/// Every method is atomic at single-key granularity, except
/// [`move_head`](KeyValueStore::move_head) which is atomic across its two keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a string value. Missing or expired keys yield `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a string value that expires `ttl_secs` after this call,
    /// replacing any previous value and expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Prepend `value` to the list at `key`, creating it if needed.
    async fn push_head(&self, key: &str, value: &str) -> Result<()>;

    /// Pop the head of `src` and prepend it to `dst` in one step.
    ///
    /// Returns `None` without touching either list when `src` is empty.
    async fn move_head(&self, src: &str, dst: &str) -> Result<Option<String>>;

    /// Peek at the head of the list at `key`.
    async fn head(&self, key: &str) -> Result<Option<String>>;

    /// Length of the list at `key` (0 when absent).
    async fn len(&self, key: &str) -> Result<usize>;

    /// Delete keys. Missing keys are ignored.
    async fn delete(&self, keys: &[&str]) -> Result<()>;

    /// Set a relative expiry on an existing key. No-op when the key is absent.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()>;

    /// Short backend name for logs and the health endpoint.
    fn name(&self) -> &str;
}
