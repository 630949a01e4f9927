use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::hooks::{HookError, HookResult};

/// Truncated SHA-256 of `(hook name, canonical context)`, tagged with the hook name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hook: String,
    digest: String,
}

impl CacheKey {
    const HEX_LEN: usize = 32;

    pub fn new(hook_name: &str, context: &Value) -> Result<Self, HookError> {
        let canonical = canonicalize(context);
        let serialized = serde_json::to_vec(&canonical)
            .map_err(|e| HookError::CacheSerialization(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(hook_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(&serialized);
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(Self::HEX_LEN);
        Ok(Self {
            hook: hook_name.to_string(),
            digest,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.digest
    }

    pub fn hook(&self) -> &str {
        &self.hook
    }
}

/// Rebuild the value with object keys in sorted order so equal contexts hash equally
/// regardless of how their maps were built.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: HookResult,
    stored_at: Instant,
    stored_at_wall: DateTime<Utc>,
}

/// TTL cache of hook results. Expiry is checked lazily on read.
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    capacity: usize,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl ResultCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: HashMap::new(),
        }
    }

    /// Returns a copy of the cached result marked `cached`, or `None` if absent or expired.
    pub fn get(&mut self, key: &CacheKey, now: Instant) -> Option<HookResult> {
        let entry = self.entries.get(key)?;
        if now.duration_since(entry.stored_at) >= self.ttl {
            self.entries.remove(key);
            return None;
        }

        let mut result = entry.result.clone();
        result.cached = true;
        result.metadata.insert(
            "cached_at".to_string(),
            Value::String(entry.stored_at_wall.to_rfc3339()),
        );
        Some(result)
    }

    pub fn insert(&mut self, key: CacheKey, result: HookResult, now: Instant) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.purge_expired(now);
        }
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.evict_oldest();
        }

        self.entries.insert(
            key,
            CacheEntry {
                result,
                stored_at: now,
                stored_at_wall: Utc::now(),
            },
        );
    }

    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.duration_since(entry.stored_at) < ttl);
        before - self.entries.len()
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    /// Drop every entry stored for `hook`. Returns how many were removed.
    pub fn forget_hook(&mut self, hook: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.hook() != hook);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
