//! # Pagination Orchestrator
//!
//! `Paginator` owns the configuration, metrics and cache backend.
//! `PageBuilder` carries one request through parsing, filtering, counting,
//! fetching and (optionally) the result cache.
//!
//! Every failure is scoped to the request it happened in: with
//! `error_enabled` the result carries the message, otherwise the caller gets
//! an empty zero-total page.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::cache::{cache_key, CacheAdapter, CacheResult, CachedPage};
use crate::compiler::PredicateCompiler;
use crate::config::Config;
use crate::errors::{ErrorKind, PageError, PageResult};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::query::QueryHandle;
use crate::request::{PageRequest, RawParams, RequestSource};
use crate::response::{PageMeta, PaginationResult};

/// Entry point for paginated queries
#[derive(Debug, Clone)]
pub struct Paginator {
    config: Arc<Config>,
    metrics: Arc<MetricsRegistry>,
}

impl Paginator {
    /// Build a paginator. Invalid size bounds are logged; requests then use
    /// the built-in defaults for them.
    pub fn new(config: Config) -> Self {
        if let Err(err) = config.validate() {
            log_event(Event::ConfigInvalid, &[("reason", err.to_string().as_str())]);
        }
        Self {
            config: Arc::new(config),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Start a request against a base query
    pub fn with<Q: QueryHandle>(&self, query: Q) -> PageBuilder<'_, Q> {
        PageBuilder {
            paginator: self,
            query,
            request: None,
            fields: None,
            cache_prefix: None,
        }
    }

    /// Clear cached pages for each prefix. Returns one outcome per prefix.
    pub fn clear_cache(&self, prefixes: &[&str]) -> Vec<CacheResult<()>> {
        let Some(adapter) = self.adapter() else {
            return prefixes.iter().map(|_| Ok(())).collect();
        };
        prefixes
            .iter()
            .map(|prefix| {
                let outcome = adapter.clear_prefix(prefix);
                log_clear(prefix, &outcome);
                outcome
            })
            .collect()
    }

    pub fn clear_all_cache(&self) -> CacheResult<()> {
        let Some(adapter) = self.adapter() else {
            return Ok(());
        };
        let outcome = adapter.clear_all();
        log_clear("*", &outcome);
        outcome
    }

    fn adapter(&self) -> Option<&Arc<dyn CacheAdapter>> {
        self.config.cache_adapter.as_ref()
    }

    /// Filter, count, then fetch one window of rows
    fn run<Q: QueryHandle>(&self, mut query: Q, request: &PageRequest) -> PageResult<CachedPage> {
        let policy = self.config.column_policy();

        if let Some(root) = &request.filters {
            let predicate =
                PredicateCompiler::new(&policy, self.config.like_as_ilike_disabled).compile(root)?;
            if !predicate.is_empty() {
                query.filter(&predicate.to_sql(), predicate.params());
            }
        }
        for sort in &request.sorts {
            policy.check(&sort.column)?;
        }
        for field in &request.fields {
            policy.check(field)?;
        }

        self.metrics.increment_count_queries();
        let total = query.count().map_err(PageError::query_failed)?;
        let meta = PageMeta::compute(request.page, request.size, total, self.config.page_start);

        let mut window = query.clone();
        for sort in &request.sorts {
            window.order_by(sort);
        }
        window.limit_offset(meta.size, meta.offset(self.config.page_start));
        if !request.fields.is_empty() {
            window.select(&request.fields);
        }

        self.metrics.increment_fetch_queries();
        let items = window.fetch().map_err(PageError::query_failed)?;

        Ok(CachedPage { meta, items })
    }
}

/// One request in flight
pub struct PageBuilder<'p, Q> {
    paginator: &'p Paginator,
    query: Q,
    request: Option<PageResult<PageRequest>>,
    fields: Option<Vec<String>>,
    cache_prefix: Option<String>,
}

impl<'p, Q: QueryHandle> PageBuilder<'p, Q> {
    /// Read page, size, sort, filters and fields from a request
    pub fn request<R: RequestSource + ?Sized>(mut self, source: &R) -> Self {
        self.request = Some(PageRequest::parse(source, &self.paginator.config));
        self
    }

    /// Override the selected columns. Ignored unless field selection is enabled.
    pub fn fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        if self.paginator.config.field_selector_enabled {
            self.fields = Some(fields.iter().map(|f| f.as_ref().to_string()).collect());
        }
        self
    }

    /// Serve through the cache under `prefix`
    pub fn cache(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = Some(prefix.into());
        self
    }

    /// Run the request and materialize rows into `T`
    pub fn response<T: DeserializeOwned>(self) -> PaginationResult<T> {
        let paginator = self.paginator;
        let config = &paginator.config;
        paginator.metrics.increment_requests();

        let request = match self.request {
            Some(parsed) => parsed,
            None => PageRequest::from_params(RawParams::default(), config),
        };
        let mut request = match request {
            Ok(request) => request,
            Err(err) => {
                let meta =
                    PageMeta::compute(config.page_start, config.resolve_size(None), 0, config.page_start);
                return paginator.fail(meta, err);
            }
        };
        if let Some(fields) = self.fields {
            request.fields = fields;
        }

        let key = match (&self.cache_prefix, paginator.adapter()) {
            (Some(prefix), Some(_)) => match cache_key(prefix, &request) {
                Ok(key) => Some(key),
                Err(err) => {
                    log_event(Event::CacheReadFailed, &[("reason", err.to_string().as_str())]);
                    None
                }
            },
            _ => None,
        };

        if let Some(page) = key.as_deref().and_then(|k| paginator.read_cache(k)) {
            return paginator.materialize(page);
        }

        match paginator.run(self.query, &request) {
            Ok(page) => {
                if let Some(key) = key.as_deref() {
                    paginator.write_cache(key, &page);
                }
                log_event(
                    Event::PageServed,
                    &[
                        ("page", page.meta.page.to_string().as_str()),
                        ("total", page.meta.total.to_string().as_str()),
                    ],
                );
                paginator.materialize(page)
            }
            Err(err) => {
                let meta = PageMeta::compute(request.page, request.size, 0, config.page_start);
                paginator.fail(meta, err)
            }
        }
    }
}

impl Paginator {
    fn read_cache(&self, key: &str) -> Option<CachedPage> {
        let adapter = self.adapter()?;
        if !adapter.is_valid(key) {
            self.metrics.increment_cache_misses();
            log_event(Event::CacheMiss, &[("key", key)]);
            return None;
        }

        match adapter.get(key).and_then(|payload| CachedPage::decode(&payload)) {
            Ok(page) => {
                self.metrics.increment_cache_hits();
                log_event(Event::CacheHit, &[("key", key)]);
                Some(page)
            }
            Err(err) => {
                self.metrics.increment_cache_misses();
                log_event(
                    Event::CacheReadFailed,
                    &[("key", key), ("reason", err.to_string().as_str())],
                );
                None
            }
        }
    }

    fn write_cache(&self, key: &str, page: &CachedPage) {
        let Some(adapter) = self.adapter() else {
            return;
        };
        if let Err(err) = page.encode().and_then(|payload| adapter.set(key, payload)) {
            self.metrics.increment_cache_write_failures();
            log_event(
                Event::CacheWriteFailed,
                &[("key", key), ("reason", err.to_string().as_str())],
            );
        }
    }

    fn materialize<T: DeserializeOwned>(&self, page: CachedPage) -> PaginationResult<T> {
        let meta = page.meta;
        match PaginationResult::new(meta, page.items).map_items(serde_json::from_value::<T>) {
            Ok(result) => result,
            Err(err) => {
                let meta = PageMeta::compute(meta.page, meta.size, 0, self.config.page_start);
                self.fail(meta, PageError::query_failed(format!("cannot decode row: {}", err)))
            }
        }
    }

    fn fail<T>(&self, meta: PageMeta, err: PageError) -> PaginationResult<T> {
        self.metrics.increment_failed_requests();
        let event = match err.kind() {
            ErrorKind::MalformedFilter => Event::FilterRejected,
            ErrorKind::ForbiddenColumn => Event::ColumnForbidden,
            ErrorKind::QueryFailed => Event::QueryFailed,
        };
        log_event(event, &[("code", err.code()), ("message", err.to_string().as_str())]);

        if self.config.error_enabled {
            PaginationResult::failed(meta, err.to_string())
        } else {
            PaginationResult::new(meta, Vec::new())
        }
    }
}

fn log_clear(prefix: &str, outcome: &CacheResult<()>) {
    match outcome {
        Ok(()) => log_event(Event::CacheCleared, &[("prefix", prefix)]),
        Err(err) => log_event(
            Event::CacheClearFailed,
            &[("prefix", prefix), ("reason", err.to_string().as_str())],
        ),
    }
}
