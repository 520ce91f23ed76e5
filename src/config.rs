//! Paginator Configuration
//!
//! One immutable `Config` is built per `Paginator` and threaded through every
//! request. All fields are optional in the JSON form.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::CacheAdapter;
use crate::compiler::ColumnPolicy;

/// Default page size when the request carries none
pub const DEFAULT_SIZE: i64 = 10;

/// Upper bound applied to requested page sizes
pub const MAX_SIZE: i64 = 1000;

/// Boolean connective between sibling filter clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connective {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl Connective {
    /// Parse a connective token, case-insensitive
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(Connective::And),
            "OR" => Some(Connective::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Paginator configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Origin page index (default: 0)
    #[serde(default)]
    pub page_start: i64,

    /// Connective between top-level filter clauses (default: AND)
    #[serde(default)]
    pub operator: Connective,

    /// Map `ilike` to plain LIKE for engines without ILIKE
    #[serde(default)]
    pub like_as_ilike_disabled: bool,

    /// Surface failures on the result instead of returning an empty page
    #[serde(default)]
    pub error_enabled: bool,

    /// Honor the `fields` directive
    #[serde(default)]
    pub field_selector_enabled: bool,

    /// Page size used when none (or an invalid one) is requested
    #[serde(default = "default_size")]
    pub default_size: i64,

    /// Largest page size a request may ask for
    #[serde(default = "default_max_size")]
    pub max_size: i64,

    /// Columns that filters, sorts and field selections may reference.
    /// `None` lets every well-formed identifier through.
    #[serde(default)]
    pub allowed_columns: Option<Vec<String>>,

    /// Result cache backend
    #[serde(skip)]
    pub cache_adapter: Option<Arc<dyn CacheAdapter>>,
}

fn default_size() -> i64 {
    DEFAULT_SIZE
}

fn default_max_size() -> i64 {
    MAX_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_start: 0,
            operator: Connective::And,
            like_as_ilike_disabled: false,
            error_enabled: false,
            field_selector_enabled: false,
            default_size: default_size(),
            max_size: default_max_size(),
            allowed_columns: None,
            cache_adapter: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("page_start", &self.page_start)
            .field("operator", &self.operator)
            .field("like_as_ilike_disabled", &self.like_as_ilike_disabled)
            .field("error_enabled", &self.error_enabled)
            .field("field_selector_enabled", &self.field_selector_enabled)
            .field("default_size", &self.default_size)
            .field("max_size", &self.max_size)
            .field("allowed_columns", &self.allowed_columns)
            .field("cache_adapter", &self.cache_adapter.is_some())
            .finish()
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the paginator cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_start < 0 {
            return Err(ConfigError::Invalid(format!(
                "page_start must be >= 0, got {}",
                self.page_start
            )));
        }
        if self.default_size <= 0 {
            return Err(ConfigError::Invalid("default_size must be > 0".to_string()));
        }
        if self.max_size < self.default_size {
            return Err(ConfigError::Invalid(format!(
                "max_size {} is below default_size {}",
                self.max_size, self.default_size
            )));
        }
        Ok(())
    }

    /// Attach a cache backend
    pub fn with_cache_adapter(mut self, adapter: Arc<dyn CacheAdapter>) -> Self {
        self.cache_adapter = Some(adapter);
        self
    }

    /// Column policy derived from `allowed_columns`
    pub fn column_policy(&self) -> ColumnPolicy {
        match &self.allowed_columns {
            Some(columns) => ColumnPolicy::allow_list(columns.iter().cloned()),
            None => ColumnPolicy::PassThrough,
        }
    }

    /// Resolve a requested page size against the configured bounds.
    ///
    /// Always in `1..=max_size`, even for a config that never passed
    /// `validate`: non-positive bounds fall back to the built-in defaults.
    pub fn resolve_size(&self, requested: Option<i64>) -> i64 {
        let max_size = if self.max_size > 0 { self.max_size } else { MAX_SIZE };
        let default_size = if self.default_size > 0 {
            self.default_size
        } else {
            DEFAULT_SIZE
        };
        match requested {
            Some(size) if size > 0 => size.min(max_size),
            _ => default_size.min(max_size),
        }
    }

    /// Resolve a requested page index against the page origin
    pub fn resolve_page(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(page) if page >= self.page_start => page,
            _ => self.page_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.page_start, 0);
        assert_eq!(config.operator, Connective::And);
        assert_eq!(config.default_size, DEFAULT_SIZE);
        assert_eq!(config.max_size, MAX_SIZE);
        assert!(config.cache_adapter.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"page_start": 1, "operator": "or"}"#).unwrap();
        assert_eq!(config.page_start, 1);
        assert_eq!(config.operator, Connective::Or);
        assert_eq!(config.default_size, DEFAULT_SIZE);
        assert!(!config.error_enabled);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"error_enabled": true, "allowed_columns": ["id", "title"]}}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.error_enabled);
        assert_eq!(
            config.allowed_columns,
            Some(vec!["id".to_string(), "title".to_string()])
        );
    }

    #[test]
    fn test_validate_rejects_bad_sizes() {
        let config = Config {
            default_size: 50,
            max_size: 20,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = Config {
            page_start: -1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_size_bounds() {
        let config = Config::default();
        assert_eq!(config.resolve_size(None), DEFAULT_SIZE);
        assert_eq!(config.resolve_size(Some(0)), DEFAULT_SIZE);
        assert_eq!(config.resolve_size(Some(-5)), DEFAULT_SIZE);
        assert_eq!(config.resolve_size(Some(25)), 25);
        assert_eq!(config.resolve_size(Some(5000)), MAX_SIZE);
    }

    #[test]
    fn test_resolve_size_with_unvalidated_bounds() {
        let config = Config {
            default_size: 0,
            ..Default::default()
        };
        assert_eq!(config.resolve_size(None), DEFAULT_SIZE);

        let config = Config {
            default_size: 50,
            max_size: 20,
            ..Default::default()
        };
        assert_eq!(config.resolve_size(None), 20);
        assert_eq!(config.resolve_size(Some(30)), 20);

        let config = Config {
            default_size: -1,
            max_size: 0,
            ..Default::default()
        };
        assert_eq!(config.resolve_size(None), DEFAULT_SIZE);
        assert_eq!(config.resolve_size(Some(5000)), MAX_SIZE);
    }

    #[test]
    fn test_resolve_page_clamps_to_origin() {
        let config = Config {
            page_start: 1,
            ..Default::default()
        };
        assert_eq!(config.resolve_page(None), 1);
        assert_eq!(config.resolve_page(Some(0)), 1);
        assert_eq!(config.resolve_page(Some(-3)), 1);
        assert_eq!(config.resolve_page(Some(7)), 7);
    }

    #[test]
    fn test_connective_parse() {
        assert_eq!(Connective::parse("and"), Some(Connective::And));
        assert_eq!(Connective::parse(" Or "), Some(Connective::Or));
        assert_eq!(Connective::parse("xor"), None);
    }
}
