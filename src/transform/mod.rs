//! Rewrite orchestration: fingerprint, cache, upstream call, sanitize, record.

pub mod prompt;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::ResponseCache;
use crate::error::{Result, ToneError};
use crate::providers::Rewriter;
use crate::session::{new_session_id, PairHistory, TransformationPair};
use crate::store::KeyValueStore;
use crate::utils::sanitize_rewrite;

pub use prompt::build_prompt;

/// Tone used when the caller does not send one.
pub const DEFAULT_TONE: i64 = 50;

/// Result of a successful rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    pub transformed: String,
    /// Effective session, freshly generated when the caller sent none.
    pub session_id: String,
    /// Served from the response cache without an upstream call.
    pub cached: bool,
}

/// Read-only view of one session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistorySnapshot {
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub current: Option<TransformationPair>,
}

/// Orchestrates one rewrite request end-to-end and exposes history operations.
pub struct TransformationService {
    store: Arc<dyn KeyValueStore>,
    cache: ResponseCache,
    rewriter: Arc<dyn Rewriter>,
    history_ttl_secs: Option<u64>,
}

impl TransformationService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        rewriter: Arc<dyn Rewriter>,
        cache_ttl_secs: u64,
        history_ttl_secs: Option<u64>,
    ) -> Self {
        Self {
            cache: ResponseCache::new(store.clone(), cache_ttl_secs),
            store,
            rewriter,
            history_ttl_secs,
        }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub fn history(&self, session_id: &str) -> PairHistory {
        PairHistory::new(self.store.clone(), session_id, self.history_ttl_secs)
    }

    /// Rewrite `text` to `tone`, recording the pair in the session's history.
    ///
    /// A failed upstream call leaves both cache and history untouched.
    pub async fn transform(
        &self,
        text: Option<&str>,
        tone: i64,
        session_id: Option<&str>,
    ) -> Result<TransformOutcome> {
        let text = text
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ToneError::Validation("Text is required".into()))?;
        let session_id = session_id
            .filter(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_else(new_session_id);
        if !(0..=100).contains(&tone) {
            warn!(tone, "Tone outside 0-100, passing through");
        }

        let fingerprint = ResponseCache::fingerprint(tone, text);
        let history = self.history(&session_id);

        // An empty cached rewrite counts as a miss.
        if let Some(cached) = self
            .cache
            .get(&fingerprint)
            .await?
            .filter(|c| !c.is_empty())
        {
            history
                .record(&TransformationPair::new(text, cached.as_str()))
                .await?;
            debug!(session_id = %session_id, tone, "Served rewrite from cache");
            return Ok(TransformOutcome {
                transformed: cached,
                session_id,
                cached: true,
            });
        }

        let raw = self.rewriter.complete(&build_prompt(text, tone)).await?;
        let transformed = sanitize_rewrite(&raw);

        if transformed.is_empty() {
            warn!(session_id = %session_id, tone, "Rewrite was empty after sanitizing, not caching");
        } else {
            self.cache.put(&fingerprint, &transformed).await?;
        }
        history
            .record(&TransformationPair::new(text, transformed.as_str()))
            .await?;
        info!(session_id = %session_id, tone, chars = transformed.len(), "Rewrote text");

        Ok(TransformOutcome {
            transformed,
            session_id,
            cached: false,
        })
    }

    pub async fn undo(&self, session_id: Option<&str>) -> Result<TransformationPair> {
        self.history(require_session(session_id)?).undo().await
    }

    pub async fn redo(&self, session_id: Option<&str>) -> Result<TransformationPair> {
        self.history(require_session(session_id)?).redo().await
    }

    pub async fn reset(&self, session_id: Option<&str>) -> Result<()> {
        self.history(require_session(session_id)?).reset().await
    }

    pub async fn snapshot(&self, session_id: Option<&str>) -> Result<HistorySnapshot> {
        let history = self.history(require_session(session_id)?);
        let (undo_depth, redo_depth) = history.depths().await?;
        Ok(HistorySnapshot {
            undo_depth,
            redo_depth,
            current: history.current().await?,
        })
    }
}

fn require_session(session_id: Option<&str>) -> Result<&str> {
    session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToneError::Validation("Session ID required".into()))
}
