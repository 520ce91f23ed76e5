//! Observable events
//!
//! Every log line the paginator emits names one of these.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Filter, sort or body could not be parsed
    FilterRejected,
    /// A column failed the identifier rule or allow-list
    ColumnForbidden,
    /// Count or fetch failed in the query engine
    QueryFailed,
    /// Page served from cache
    CacheHit,
    /// No valid cache entry; page computed
    CacheMiss,
    /// Cache entry present but unreadable; treated as a miss
    CacheReadFailed,
    /// Computed page could not be stored
    CacheWriteFailed,
    /// Prefix or full clear succeeded
    CacheCleared,
    /// Prefix or full clear failed
    CacheClearFailed,
    /// Page computed and returned
    PageServed,
    /// Paginator built from a config that fails validation
    ConfigInvalid,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::FilterRejected => "FILTER_REJECTED",
            Event::ColumnForbidden => "COLUMN_FORBIDDEN",
            Event::QueryFailed => "QUERY_FAILED",
            Event::CacheHit => "CACHE_HIT",
            Event::CacheMiss => "CACHE_MISS",
            Event::CacheReadFailed => "CACHE_READ_FAILED",
            Event::CacheWriteFailed => "CACHE_WRITE_FAILED",
            Event::CacheCleared => "CACHE_CLEARED",
            Event::CacheClearFailed => "CACHE_CLEAR_FAILED",
            Event::PageServed => "PAGE_SERVED",
            Event::ConfigInvalid => "CONFIG_INVALID",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::CacheHit | Event::CacheMiss | Event::PageServed => Severity::Trace,
            Event::CacheCleared => Severity::Info,
            Event::FilterRejected
            | Event::ColumnForbidden
            | Event::CacheReadFailed
            | Event::CacheWriteFailed
            | Event::CacheClearFailed
            | Event::ConfigInvalid => Severity::Warn,
            Event::QueryFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
