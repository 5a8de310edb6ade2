//! In-process [`KeyValueStore`].
//!
//! Expired keys are dropped when read, and every write that creates a key
//! first evicts all expired slots, so keys that are never read again do not
//! accumulate.
//!
//! Follows Redis semantics closely enough for the cache and history to behave
//! identically: string and list values share one keyspace, list operations on
//! a string key fail with a wrong-type error, and an emptied list disappears.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, ToneError};

use super::KeyValueStore;

#[derive(Debug)]
enum Value {
    Str(String),
    List(VecDeque<String>),
}

#[derive(Debug)]
struct Slot {
    value: Value,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Single-process store guarded by one async mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn wrong_type(key: &str) -> ToneError {
    ToneError::Store(format!(
        "WRONGTYPE operation against key '{key}' holding the wrong kind of value"
    ))
}

/// Drop `key` if it has expired, then return the live slot, if any.
fn live_slot<'a>(slots: &'a mut HashMap<String, Slot>, key: &str) -> Option<&'a mut Slot> {
    let now = Instant::now();
    if slots.get(key).is_some_and(|s| !s.is_live(now)) {
        slots.remove(key);
    }
    slots.get_mut(key)
}

/// Remove every slot whose TTL has passed.
fn evict_expired(slots: &mut HashMap<String, Slot>) {
    let now = Instant::now();
    let before = slots.len();
    slots.retain(|_, s| s.is_live(now));
    let evicted = before - slots.len();
    if evicted > 0 {
        debug!(evicted, "Evicted expired keys");
    }
}

fn list_mut<'a>(
    slots: &'a mut HashMap<String, Slot>,
    key: &str,
) -> Result<Option<&'a mut VecDeque<String>>> {
    match live_slot(slots, key) {
        None => Ok(None),
        Some(Slot {
            value: Value::List(list),
            ..
        }) => Ok(Some(list)),
        Some(_) => Err(wrong_type(key)),
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut slots = self.slots.lock().await;
        match live_slot(&mut slots, key) {
            None => Ok(None),
            Some(Slot {
                value: Value::Str(s),
                ..
            }) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut slots = self.slots.lock().await;
        evict_expired(&mut slots);
        slots.insert(
            key.to_string(),
            Slot {
                value: Value::Str(value.to_string()),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
            },
        );
        Ok(())
    }

    async fn push_head(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().await;
        match list_mut(&mut slots, key)? {
            Some(list) => list.push_front(value.to_string()),
            None => {
                evict_expired(&mut slots);
                slots.insert(
                    key.to_string(),
                    Slot {
                        value: Value::List(VecDeque::from([value.to_string()])),
                        expires_at: None,
                    },
                );
            }
        }
        Ok(())
    }

    async fn move_head(&self, src: &str, dst: &str) -> Result<Option<String>> {
        let mut slots = self.slots.lock().await;
        // Validate the destination type before mutating the source.
        list_mut(&mut slots, dst)?;
        let Some(list) = list_mut(&mut slots, src)? else {
            return Ok(None);
        };
        let Some(item) = list.pop_front() else {
            return Ok(None);
        };
        if list.is_empty() {
            slots.remove(src);
        }
        match list_mut(&mut slots, dst)? {
            Some(list) => list.push_front(item.clone()),
            None => {
                evict_expired(&mut slots);
                slots.insert(
                    dst.to_string(),
                    Slot {
                        value: Value::List(VecDeque::from([item.clone()])),
                        expires_at: None,
                    },
                );
            }
        }
        Ok(Some(item))
    }

    async fn head(&self, key: &str) -> Result<Option<String>> {
        let mut slots = self.slots.lock().await;
        Ok(list_mut(&mut slots, key)?.and_then(|list| list.front().cloned()))
    }

    async fn len(&self, key: &str) -> Result<usize> {
        let mut slots = self.slots.lock().await;
        Ok(list_mut(&mut slots, key)?.map_or(0, |list| list.len()))
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        let mut slots = self.slots.lock().await;
        for key in keys {
            slots.remove(*key);
        }
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()> {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = live_slot(&mut slots, key) {
            slot.expires_at = Some(Instant::now() + Duration::from_secs(ttl_secs));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
