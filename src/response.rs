//! # Pagination Result
//!
//! The envelope returned for every request, successful or not.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Page arithmetic derived from one count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: i64,
    pub size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub max_page: i64,
    pub first: bool,
    pub last: bool,
}

impl PageMeta {
    /// Derive page counts and boundary flags.
    ///
    /// An empty result has zero pages and is both first and last at
    /// `page_start`. Pages past `max_page` are neither.
    pub fn compute(page: i64, size: i64, total: i64, page_start: i64) -> Self {
        let total_pages = if total <= 0 || size <= 0 {
            0
        } else {
            total / size + i64::from(total % size != 0)
        };
        let max_page = if total_pages > 0 {
            total_pages - 1 + page_start
        } else {
            page_start
        };

        Self {
            page,
            size,
            total: total.max(0),
            total_pages,
            max_page,
            first: page == page_start,
            last: page == max_page,
        }
    }

    /// Row offset of this page
    ///
    /// Saturates for pages far past the end; such a window is simply empty.
    pub fn offset(&self, page_start: i64) -> i64 {
        self.page
            .saturating_sub(page_start)
            .max(0)
            .saturating_mul(self.size)
    }
}

/// Result of a paginated request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub max_page: i64,
    pub total_pages: i64,
    pub total: i64,
    pub last: bool,
    pub first: bool,
    /// Number of items on this page
    pub visible: i64,
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl<T> PaginationResult<T> {
    pub fn new(meta: PageMeta, items: Vec<T>) -> Self {
        Self {
            visible: items.len() as i64,
            items,
            page: meta.page,
            size: meta.size,
            max_page: meta.max_page,
            total_pages: meta.total_pages,
            total: meta.total,
            last: meta.last,
            first: meta.first,
            error: false,
            error_message: None,
        }
    }

    /// Empty page carrying an error message
    pub fn failed(meta: PageMeta, message: impl Into<String>) -> Self {
        Self {
            error: true,
            error_message: Some(message.into()),
            ..Self::new(meta, Vec::new())
        }
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            page: self.page,
            size: self.size,
            total: self.total,
            total_pages: self.total_pages,
            max_page: self.max_page,
            first: self.first,
            last: self.last,
        }
    }

    /// Convert the items, keeping the metadata
    pub fn map_items<U, E>(
        self,
        f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<PaginationResult<U>, E> {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(PaginationResult {
            items,
            page: self.page,
            size: self.size,
            max_page: self.max_page,
            total_pages: self.total_pages,
            total: self.total,
            last: self.last,
            first: self.first,
            visible: self.visible,
            error: self.error,
            error_message: self.error_message,
        })
    }
}

impl<T: Serialize> IntoResponse for PaginationResult<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
