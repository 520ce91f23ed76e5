//! # Pagination Errors
//!
//! Every failure a single pagination request can hit. None of them is fatal
//! to the process; the paginator decides per configuration whether they
//! surface on the result or collapse into an empty page.

use std::fmt;

use thiserror::Error;

/// Result type for pagination operations
pub type PageResult<T> = Result<T, PageError>;

/// Error taxonomy for a pagination request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unparsable filter JSON, wrong arity, unknown operator, bad value shape
    MalformedFilter,
    /// Column rejected by the identifier rule or the allow-list
    ForbiddenColumn,
    /// The query engine failed to count or fetch
    QueryFailed,
}

impl ErrorKind {
    /// Stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MalformedFilter => "PAGINATE_MALFORMED_FILTER",
            ErrorKind::ForbiddenColumn => "PAGINATE_FORBIDDEN_COLUMN",
            ErrorKind::QueryFailed => "PAGINATE_QUERY_FAILED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Pagination errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PageError {
    /// Invalid filter expression
    #[error("Invalid filter: {0}")]
    MalformedFilter(String),

    /// Column not allowed
    #[error("Column not allowed: {0}")]
    ForbiddenColumn(String),

    /// Query engine failure
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl PageError {
    pub fn malformed(message: impl Into<String>) -> Self {
        PageError::MalformedFilter(message.into())
    }

    pub fn forbidden(column: impl Into<String>) -> Self {
        PageError::ForbiddenColumn(column.into())
    }

    pub fn query_failed(message: impl fmt::Display) -> Self {
        PageError::QueryFailed(message.to_string())
    }

    /// Get the taxonomy kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PageError::MalformedFilter(_) => ErrorKind::MalformedFilter,
            PageError::ForbiddenColumn(_) => ErrorKind::ForbiddenColumn,
            PageError::QueryFailed(_) => ErrorKind::QueryFailed,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            PageError::malformed("bad").kind(),
            ErrorKind::MalformedFilter
        );
        assert_eq!(PageError::forbidden("x").kind(), ErrorKind::ForbiddenColumn);
        assert_eq!(
            PageError::query_failed("no such column: x").code(),
            "PAGINATE_QUERY_FAILED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = PageError::forbidden("users.password");
        assert_eq!(err.to_string(), "Column not allowed: users.password");
    }
}
