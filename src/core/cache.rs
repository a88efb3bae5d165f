//! In-memory TTL cache backing the client.
//!
//! Entries carry an optional absolute expiry instant and are evicted lazily:
//! an expired entry is removed by the read that finds it. There is no size
//! bound.

use crate::domain::ports::CacheStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct CacheEntry {
    value: Value,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            entries.remove(key);
            tracing::debug!(key, "cache entry expired");
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.lock()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

/// Cache that stores nothing. Every read misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl CacheStore for NoopCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set(&self, _key: &str, _value: Value, _ttl: Option<Duration>) {}

    fn clear(&self) {}
}
