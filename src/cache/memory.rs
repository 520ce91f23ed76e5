//! In-process cache adapters

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{Duration, Utc};

use super::errors::{CacheError, CacheResult};
use super::{CacheAdapter, CacheEntry};

/// Adapter that stores nothing; every lookup misses
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl CacheAdapter for NoopCache {
    fn get(&self, key: &str) -> CacheResult<String> {
        Err(CacheError::NotFound(key.to_string()))
    }

    fn set(&self, _key: &str, _value: String) -> CacheResult<()> {
        Ok(())
    }

    fn is_valid(&self, _key: &str) -> bool {
        false
    }

    fn clear(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    fn clear_prefix(&self, _prefix: &str) -> CacheResult<()> {
        Ok(())
    }

    fn clear_all(&self) -> CacheResult<()> {
        Ok(())
    }
}

/// HashMap-backed cache with an optional time-to-live.
///
/// Expired entries are treated as absent and dropped lazily on the next
/// write or clear.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Cache whose entries never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose entries expire `ttl` after being written
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    /// Number of stored entries, expired ones included.
    ///
    /// A poisoned lock still reports the entries it holds.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| CacheError::Backend("Lock poisoned".to_string()))?;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(Utc::now()))
            .cloned())
    }

    fn write<F>(&self, f: F) -> CacheResult<()>
    where
        F: FnOnce(&mut HashMap<String, CacheEntry>),
    {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::Backend("Lock poisoned".to_string()))?;
        let now = Utc::now();
        entries.retain(|_, entry| !entry.is_expired(now));
        f(&mut entries);
        Ok(())
    }
}

impl CacheAdapter for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<String> {
        self.lookup(key)?
            .map(|entry| entry.payload)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn set(&self, key: &str, value: String) -> CacheResult<()> {
        let expires_at = self.ttl.map(|ttl| Utc::now() + ttl);
        self.write(|entries| {
            entries.insert(
                key.to_string(),
                CacheEntry {
                    key: key.to_string(),
                    payload: value,
                    expires_at,
                },
            );
        })
    }

    fn is_valid(&self, key: &str) -> bool {
        matches!(self.lookup(key), Ok(Some(_)))
    }

    fn clear(&self, key: &str) -> CacheResult<()> {
        self.write(|entries| {
            entries.remove(key);
        })
    }

    fn clear_prefix(&self, prefix: &str) -> CacheResult<()> {
        self.write(|entries| entries.retain(|key, _| !key.starts_with(prefix)))
    }

    fn clear_all(&self) -> CacheResult<()> {
        self.write(|entries| entries.clear())
    }
}
