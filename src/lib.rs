//! paginate - request-driven pagination for SQL query handles
//!
//! A request (query string or JSON body) is parsed into page, size, sort,
//! filter and field directives; filters compile to a parameterized SQL
//! predicate; the base query is counted and windowed; results are optionally
//! served through a pluggable cache.

pub mod cache;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod errors;
pub mod filter;
pub mod observability;
pub mod paginator;
pub mod query;
pub mod request;
pub mod response;
pub mod sort;

pub use cache::{CacheAdapter, CacheError, CacheResult, MemoryCache, NoopCache};
pub use compiler::{ColumnPolicy, Predicate, PredicateCompiler};
pub use config::{Config, ConfigError, Connective};
pub use errors::{ErrorKind, PageError, PageResult};
pub use filter::{FilterLeaf, FilterNode, FilterOperator, FilterValue};
pub use paginator::{PageBuilder, Paginator};
pub use query::{QueryHandle, SqliteQuery};
pub use request::{PageRequest, RawRequest, RequestSource};
pub use response::{PageMeta, PaginationResult};
pub use sort::{SortDirection, SortDirective};
