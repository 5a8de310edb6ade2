//! Rewrite response cache with a fixed TTL.
//!
//! Cache key is a SHA-256 digest of `"<tone>:<text>"` rendered as lowercase
//! hex, stored as a bare key in the shared store. The store owns expiry, so
//! entries survive process restarts for as long as the store keeps them.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;
use crate::store::KeyValueStore;

/// Default entry lifetime in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Memoizes rewritten text by (tone, text) fingerprint.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    ttl_secs: u64,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    /// Build the deterministic cache key for a rewrite request.
    pub fn fingerprint(tone: i64, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{tone}:{text}").as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Look up a cached rewrite. Missing or expired entries yield `None`.
    pub async fn get(&self, fingerprint: &str) -> Result<Option<String>> {
        let hit = self.store.get(fingerprint).await?;
        debug!(
            fingerprint = %short(fingerprint),
            hit = hit.is_some(),
            "Response cache lookup"
        );
        Ok(hit)
    }

    /// Store a rewrite, replacing any previous value and restarting its TTL.
    pub async fn put(&self, fingerprint: &str, value: &str) -> Result<()> {
        self.store.set_ex(fingerprint, value, self.ttl_secs).await?;
        debug!(fingerprint = %short(fingerprint), ttl_secs = self.ttl_secs, "Cached rewrite");
        Ok(())
    }
}

fn short(key: &str) -> &str {
    &key[..8.min(key.len())]
}
