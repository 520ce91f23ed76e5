//! Cache key derivation
//!
//! Two requests with the same page, size, sorts, decoded filter JSON and
//! fields map to the same key. No semantic normalization is attempted: a
//! reordered but equivalent filter gets a different key.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::errors::CacheResult;
use crate::request::PageRequest;
use crate::sort::SortDirective;

#[derive(Serialize)]
struct Signature<'a> {
    page: i64,
    size: i64,
    sorts: &'a [SortDirective],
    filters: Option<&'a Value>,
    fields: &'a [String],
}

/// Canonical JSON signature of a request
pub fn request_signature(request: &PageRequest) -> CacheResult<String> {
    let signature = Signature {
        page: request.page,
        size: request.size,
        sorts: &request.sorts,
        filters: request.raw_filters.as_ref(),
        fields: &request.fields,
    };
    Ok(serde_json::to_string(&signature)?)
}

/// `prefix:sha256(signature)`
pub fn cache_key(prefix: &str, request: &PageRequest) -> CacheResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(request_signature(request)?.as_bytes());
    Ok(format!("{}:{:x}", prefix, hasher.finalize()))
}
