//! Redis-backed [`KeyValueStore`].

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Direction};
use tracing::{debug, info};

use crate::error::{Result, ToneError};

use super::KeyValueStore;

/// Store backed by a single Redis [`ConnectionManager`].
///
/// The manager multiplexes commands over one connection and reconnects on
/// failure; cloning it is cheap, so every call works on its own clone.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Open a client for `url` and establish the managed connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| ToneError::Store(format!("invalid Redis URL: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| ToneError::Store(format!("Redis connection failed: {e}")))?;
        info!(url = %redact_url(url), "Connected to Redis");
        Ok(Self { conn })
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn push_head(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: usize = conn.lpush(key, value).await?;
        Ok(())
    }

    async fn move_head(&self, src: &str, dst: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        // LMOVE returns nil on an empty source, so emptiness and the move are one step.
        let moved: Option<String> = conn
            .lmove(src, dst, Direction::Left, Direction::Left)
            .await?;
        debug!(src, dst, moved = moved.is_some(), "LMOVE");
        Ok(moved)
    }

    async fn head(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.lindex(key, 0).await?)
    }

    async fn len(&self, key: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        Ok(conn.llen(key).await?)
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let _: usize = conn.del(keys).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()> {
        let seconds = i64::try_from(ttl_secs)
            .map_err(|_| ToneError::Store(format!("expiry out of range: {ttl_secs}")))?;
        let mut conn = self.conn.clone();
        let _: bool = conn.expire(key, seconds).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "redis"
    }
}

/// Strip credentials from a Redis URL before logging it.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://[REDACTED]{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
