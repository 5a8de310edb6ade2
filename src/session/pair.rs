//! Typed (original, transformed) entries on top of [`History`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::KeyValueStore;

use super::History;

/// One completed rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationPair {
    pub original: String,
    pub transformed: String,
}

impl TransformationPair {
    pub fn new(original: impl Into<String>, transformed: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            transformed: transformed.into(),
        }
    }
}

/// Session history whose payloads are JSON-encoded [`TransformationPair`]s.
pub struct PairHistory {
    inner: History,
}

impl PairHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, session_id: &str, ttl_secs: Option<u64>) -> Self {
        Self {
            inner: History::new(store, session_id).with_ttl(ttl_secs),
        }
    }

    pub async fn record(&self, pair: &TransformationPair) -> Result<()> {
        let payload = serde_json::to_string(pair)?;
        self.inner.push_undo(&payload).await
    }

    pub async fn undo(&self) -> Result<TransformationPair> {
        let payload = self.inner.undo().await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn redo(&self) -> Result<TransformationPair> {
        let payload = self.inner.redo().await?;
        Ok(serde_json::from_str(&payload)?)
    }

    pub async fn reset(&self) -> Result<()> {
        self.inner.reset().await
    }

    pub async fn current(&self) -> Result<Option<TransformationPair>> {
        match self.inner.current().await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub async fn depths(&self) -> Result<(usize, usize)> {
        self.inner.depths().await
    }
}
