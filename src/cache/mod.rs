//! # Result Cache
//!
//! Pluggable storage for serialized pagination results. The paginator only
//! reads through `is_valid` + `get` and writes through `set`; both are
//! best-effort, so a failing backend degrades to "no cache", never to a
//! failed request.
//!
//! No locking is done around races between readers and `clear_*` calls; an
//! adapter's own atomicity is all a caller gets.

mod errors;
mod key;
mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use errors::{CacheError, CacheResult};
pub use key::{cache_key, request_signature};
pub use memory::{MemoryCache, NoopCache};

use crate::response::PageMeta;

/// Cache backend capabilities
pub trait CacheAdapter: Send + Sync {
    /// Read the payload stored under `key`
    fn get(&self, key: &str) -> CacheResult<String>;

    /// Store `value` under `key`, replacing any previous entry
    fn set(&self, key: &str, value: String) -> CacheResult<()>;

    /// Whether `key` holds an unexpired entry
    fn is_valid(&self, key: &str) -> bool;

    fn clear(&self, key: &str) -> CacheResult<()>;

    /// Remove every entry whose key starts with `prefix`
    fn clear_prefix(&self, prefix: &str) -> CacheResult<()>;

    fn clear_all(&self) -> CacheResult<()>;
}

/// A stored entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub payload: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Serialized form of a page: metadata plus raw rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPage {
    pub meta: PageMeta,
    pub items: Vec<Value>,
}

impl CachedPage {
    pub fn encode(&self) -> CacheResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(payload: &str) -> CacheResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}
