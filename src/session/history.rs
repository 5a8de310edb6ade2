//! Per-session linear undo/redo history over the shared store.
//!
//! Two lists per session, `<session>:undo` and `<session>:redo`, both
//! most-recent-first. Recording a new entry clears the redo list; undo and
//! redo move the head of one list onto the other with a single atomic store
//! call, so concurrent callers cannot both pop the last entry.

use std::sync::Arc;

use tracing::debug;

use crate::error::{HistoryOp, Result, ToneError};
use crate::store::KeyValueStore;

/// Undo/redo stacks of opaque string payloads for one session.
pub struct History {
    store: Arc<dyn KeyValueStore>,
    session_id: String,
    undo_key: String,
    redo_key: String,
    ttl_secs: Option<u64>,
}

impl History {
    pub fn new(store: Arc<dyn KeyValueStore>, session_id: &str) -> Self {
        Self {
            store,
            session_id: session_id.to_string(),
            undo_key: format!("{session_id}:undo"),
            redo_key: format!("{session_id}:redo"),
            ttl_secs: None,
        }
    }

    /// Expire both stacks `ttl_secs` after the most recent mutation.
    pub fn with_ttl(mut self, ttl_secs: Option<u64>) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn undo_key(&self) -> &str {
        &self.undo_key
    }

    pub fn redo_key(&self) -> &str {
        &self.redo_key
    }

    /// Record a new entry. Any redo future is discarded.
    pub async fn push_undo(&self, payload: &str) -> Result<()> {
        self.store.push_head(&self.undo_key, payload).await?;
        self.store.delete(&[self.redo_key.as_str()]).await?;
        self.touch().await?;
        debug!(session_id = %self.session_id, "Recorded history entry");
        Ok(())
    }

    /// Move the most recent undo entry onto the redo stack and return it.
    pub async fn undo(&self) -> Result<String> {
        self.step(HistoryOp::Undo).await
    }

    /// Move the most recent redo entry back onto the undo stack and return it.
    pub async fn redo(&self) -> Result<String> {
        self.step(HistoryOp::Redo).await
    }

    /// Delete both stacks. Succeeds when they are already absent.
    pub async fn reset(&self) -> Result<()> {
        self.store
            .delete(&[self.undo_key.as_str(), self.redo_key.as_str()])
            .await?;
        debug!(session_id = %self.session_id, "History reset");
        Ok(())
    }

    /// The most recent undo entry without moving it.
    pub async fn current(&self) -> Result<Option<String>> {
        self.store.head(&self.undo_key).await
    }

    /// `(undo_depth, redo_depth)`.
    pub async fn depths(&self) -> Result<(usize, usize)> {
        let undo = self.store.len(&self.undo_key).await?;
        let redo = self.store.len(&self.redo_key).await?;
        Ok((undo, redo))
    }

    async fn step(&self, op: HistoryOp) -> Result<String> {
        let (src, dst) = match op {
            HistoryOp::Undo => (&self.undo_key, &self.redo_key),
            HistoryOp::Redo => (&self.redo_key, &self.undo_key),
        };
        let payload = self
            .store
            .move_head(src, dst)
            .await?
            .ok_or(ToneError::EmptyHistory(op))?;
        self.touch().await?;
        debug!(session_id = %self.session_id, %op, "History step");
        Ok(payload)
    }

    async fn touch(&self) -> Result<()> {
        if let Some(ttl) = self.ttl_secs {
            self.store.expire(&self.undo_key, ttl).await?;
            self.store.expire(&self.redo_key, ttl).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn history(store: &Arc<MemoryStore>) -> History {
        History::new(store.clone(), "s1")
    }

    #[test]
    fn test_keys_derived_from_session() {
        let h = History::new(Arc::new(MemoryStore::new()), "abc");
        assert_eq!(h.undo_key(), "abc:undo");
        assert_eq!(h.redo_key(), "abc:redo");
        assert_eq!(h.session_id(), "abc");
    }

    #[tokio::test]
    async fn test_undo_after_push_returns_payload_and_redo_restores() {
        let store = Arc::new(MemoryStore::new());
        let h = history(&store);
        h.push_undo("a").await.unwrap();
        h.push_undo("p").await.unwrap();
        let before = h.depths().await.unwrap().0;

        assert_eq!(h.undo().await.unwrap(), "p");
        assert_eq!(h.depths().await.unwrap(), (before - 1, 1));

        assert_eq!(h.redo().await.unwrap(), "p");
        assert_eq!(h.depths().await.unwrap(), (before, 0));
    }

    #[tokio::test]
    async fn test_undo_on_empty_fails() {
        let store = Arc::new(MemoryStore::new());
        let err = history(&store).undo().await.unwrap_err();
        assert!(matches!(err, ToneError::EmptyHistory(HistoryOp::Undo)));
    }

    #[tokio::test]
    async fn test_redo_on_empty_fails() {
        let store = Arc::new(MemoryStore::new());
        let h = history(&store);
        h.push_undo("a").await.unwrap();
        let err = h.redo().await.unwrap_err();
        assert!(matches!(err, ToneError::EmptyHistory(HistoryOp::Redo)));
    }

    #[tokio::test]
    async fn test_push_clears_redo() {
        let store = Arc::new(MemoryStore::new());
        let h = history(&store);
        h.push_undo("a").await.unwrap();
        h.push_undo("b").await.unwrap();
        h.undo().await.unwrap();
        h.undo().await.unwrap();
        assert_eq!(h.depths().await.unwrap(), (0, 2));

        h.push_undo("c").await.unwrap();
        assert_eq!(h.depths().await.unwrap(), (1, 0));
        assert!(h.redo().await.is_err());
    }

    #[tokio::test]
    async fn test_reset_empties_both_stacks() {
        let store = Arc::new(MemoryStore::new());
        let h = history(&store);
        h.push_undo("a").await.unwrap();
        h.push_undo("b").await.unwrap();
        h.undo().await.unwrap();

        h.reset().await.unwrap();
        assert_eq!(h.depths().await.unwrap(), (0, 0));
        assert!(matches!(
            h.undo().await,
            Err(ToneError::EmptyHistory(HistoryOp::Undo))
        ));
        assert!(matches!(
            h.redo().await,
            Err(ToneError::EmptyHistory(HistoryOp::Redo))
        ));
    }

    #[tokio::test]
    async fn test_reset_when_absent_is_ok() {
        let store = Arc::new(MemoryStore::new());
        history(&store).reset().await.unwrap();
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = Arc::new(MemoryStore::new());
        let a = History::new(store.clone(), "a");
        let b = History::new(store.clone(), "b");
        a.push_undo("x").await.unwrap();
        assert!(b.undo().await.is_err());
        assert_eq!(a.undo().await.unwrap(), "x");
    }

    #[tokio::test]
    async fn test_current_peeks_without_moving() {
        let store = Arc::new(MemoryStore::new());
        let h = history(&store);
        assert!(h.current().await.unwrap().is_none());
        h.push_undo("a").await.unwrap();
        h.push_undo("b").await.unwrap();
        assert_eq!(h.current().await.unwrap().as_deref(), Some("b"));
        assert_eq!(h.depths().await.unwrap(), (2, 0));
    }

    #[tokio::test]
    async fn test_concurrent_undo_single_entry_one_wins() {
        let store = Arc::new(MemoryStore::new());
        history(&store).push_undo("only").await.unwrap();

        let h1 = history(&store);
        let h2 = history(&store);
        let (r1, r2) = tokio::join!(h1.undo(), h2.undo());
        assert_eq!(
            [r1.is_ok(), r2.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_ttl_expires_history() {
        let store = Arc::new(MemoryStore::new());
        let h = history(&store).with_ttl(Some(0));
        h.push_undo("a").await.unwrap();
        assert_eq!(h.depths().await.unwrap(), (0, 0));
    }
}
