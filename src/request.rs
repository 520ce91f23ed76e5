//! # Request Parsing
//!
//! Reads `page`, `size`, `sort`, `filters` and `fields` from an HTTP-style
//! request. GET requests carry them in the query string; POST requests in a
//! JSON body, where every field may be a string or a number.

use axum::extract::Query;
use axum::http::{Method, Request, Uri};
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::errors::{PageError, PageResult};
use crate::filter::{decode_filters, parse_filters, FilterNode};
use crate::sort::{parse_fields, parse_sorts, SortDirective};

/// What the paginator needs from an incoming request
pub trait RequestSource {
    fn method(&self) -> &Method;

    /// Raw query string without the leading `?`
    fn query(&self) -> Option<&str>;

    fn body(&self) -> &[u8];
}

impl<B: AsRef<[u8]>> RequestSource for Request<B> {
    fn method(&self) -> &Method {
        Request::method(self)
    }

    fn query(&self) -> Option<&str> {
        self.uri().query()
    }

    fn body(&self) -> &[u8] {
        Request::body(self).as_ref()
    }
}

/// Owned request for callers without an `http::Request` at hand
#[derive(Debug, Clone)]
pub struct RawRequest {
    method: Method,
    query: Option<String>,
    body: Vec<u8>,
}

impl RawRequest {
    pub fn get(query: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            query: Some(query.into()),
            body: Vec::new(),
        }
    }

    pub fn post(body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::POST,
            query: None,
            body: body.into(),
        }
    }
}

impl RequestSource for RawRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

#[derive(Debug, Default, Deserialize)]
struct QueryStringParams {
    page: Option<String>,
    size: Option<String>,
    sort: Option<String>,
    filters: Option<String>,
    fields: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BodyParams {
    #[serde(default)]
    page: Value,
    #[serde(default)]
    size: Value,
    #[serde(default)]
    sort: Value,
    #[serde(default)]
    filters: Value,
    #[serde(default)]
    fields: Value,
}

/// Parameters as they arrived, before interpretation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
    pub filters: Option<Value>,
    pub fields: Option<String>,
}

impl RawParams {
    /// Read raw parameters from a request
    pub fn from_source<R: RequestSource + ?Sized>(source: &R) -> PageResult<Self> {
        if *source.method() == Method::POST {
            Self::from_body(source.body())
        } else {
            Self::from_query(source.query().unwrap_or_default())
        }
    }

    fn from_query(query: &str) -> PageResult<Self> {
        if query.trim().is_empty() {
            return Ok(Self::default());
        }

        let uri: Uri = format!("/?{}", query)
            .parse()
            .map_err(|e| PageError::malformed(format!("invalid query string: {}", e)))?;
        let Query(params) = Query::<QueryStringParams>::try_from_uri(&uri)
            .map_err(|e| PageError::malformed(format!("invalid query string: {}", e)))?;

        Ok(Self {
            page: params.page,
            size: params.size,
            sort: params.sort,
            filters: params.filters.map(Value::String),
            fields: params.fields,
        })
    }

    fn from_body(body: &[u8]) -> PageResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let params: BodyParams = serde_json::from_slice(body)
            .map_err(|e| PageError::malformed(format!("invalid JSON body: {}", e)))?;

        Ok(Self {
            page: loose_string(&params.page),
            size: loose_string(&params.size),
            sort: loose_string(&params.sort),
            filters: (!params.filters.is_null()).then_some(params.filters),
            fields: loose_string(&params.fields),
        })
    }
}

fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn loose_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

/// A parsed, immutable pagination request
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub sorts: Vec<SortDirective>,
    pub filters: Option<FilterNode>,
    /// Decoded filter JSON, kept for the cache signature
    pub raw_filters: Option<Value>,
    /// Selected columns; empty unless field selection is enabled
    pub fields: Vec<String>,
}

impl PageRequest {
    /// Parse a request under the given configuration
    pub fn parse<R: RequestSource + ?Sized>(source: &R, config: &Config) -> PageResult<Self> {
        Self::from_params(RawParams::from_source(source)?, config)
    }

    pub fn from_params(params: RawParams, config: &Config) -> PageResult<Self> {
        let raw_filters = match &params.filters {
            Some(raw) => decode_filters(raw)?,
            None => None,
        };
        let filters = match &raw_filters {
            Some(decoded) => parse_filters(decoded, config.operator)?,
            None => None,
        };

        let fields = match (&params.fields, config.field_selector_enabled) {
            (Some(fields), true) => parse_fields(fields),
            _ => Vec::new(),
        };

        Ok(Self {
            page: config.resolve_page(loose_int(params.page.as_deref())),
            size: config.resolve_size(loose_int(params.size.as_deref())),
            sorts: params.sort.as_deref().map(parse_sorts).unwrap_or_default(),
            filters,
            raw_filters,
            fields,
        })
    }
}
