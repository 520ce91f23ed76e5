//! # Query Engine Boundary
//!
//! The paginator never issues SQL itself. It hands compiled predicates,
//! ORDER BY terms, and LIMIT/OFFSET to a `QueryHandle`, then asks the handle
//! to count or fetch. Handles are cloned so the count never sees the
//! LIMIT/OFFSET applied for the fetch.

pub mod sqlite;

use std::fmt;

use serde_json::Value;

use crate::filter::FilterValue;
use crate::sort::SortDirective;

pub use sqlite::SqliteQuery;

/// A base query that can be narrowed, ordered, counted and fetched
pub trait QueryHandle: Clone {
    /// Engine-level failure
    type Error: fmt::Display;

    /// AND a predicate with positional `?` parameters onto the query
    fn filter(&mut self, predicate: &str, params: &[FilterValue]);

    /// Append an ORDER BY term
    fn order_by(&mut self, sort: &SortDirective);

    /// Restrict the selected columns
    fn select(&mut self, fields: &[String]);

    fn limit_offset(&mut self, limit: i64, offset: i64);

    /// Count matching rows, ignoring LIMIT/OFFSET
    fn count(&self) -> Result<i64, Self::Error>;

    /// Fetch matching rows as JSON objects keyed by column name
    fn fetch(&self) -> Result<Vec<Value>, Self::Error>;
}
