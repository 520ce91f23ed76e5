//! Filter values
//!
//! Closed set of value shapes a filter clause may carry. Anything else in the
//! decoded JSON (objects, nested arrays) is rejected when the clause is parsed.

use serde::Serialize;
use serde_json::Value;

use crate::errors::{PageError, PageResult};

/// A scalar or a flat list of scalars
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<FilterValue>),
}

impl FilterValue {
    /// Convert a decoded JSON value
    pub fn from_json(value: &Value) -> PageResult<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(Self::scalar_from_json)
                .collect::<PageResult<Vec<_>>>()
                .map(FilterValue::Array),
            other => Self::scalar_from_json(other),
        }
    }

    fn scalar_from_json(value: &Value) -> PageResult<Self> {
        match value {
            Value::Null => Ok(FilterValue::Null),
            Value::Bool(b) => Ok(FilterValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FilterValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(FilterValue::Float(f))
                } else {
                    Err(PageError::malformed(format!("unsupported number: {}", n)))
                }
            }
            Value::String(s) => Ok(FilterValue::String(s.clone())),
            Value::Array(_) => Err(PageError::malformed("nested arrays are not valid values")),
            Value::Object(_) => Err(PageError::malformed("objects are not valid values")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    pub fn as_array(&self) -> Option<&[FilterValue]> {
        match self {
            FilterValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Text form used when wrapping LIKE patterns
    pub fn to_pattern_text(&self) -> String {
        match self {
            FilterValue::Null => String::new(),
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Int(i) => i.to_string(),
            FilterValue::Float(f) => f.to_string(),
            FilterValue::String(s) => s.clone(),
            FilterValue::Array(items) => items
                .iter()
                .map(FilterValue::to_pattern_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(FilterValue::from_json(&json!(null)).unwrap(), FilterValue::Null);
        assert_eq!(FilterValue::from_json(&json!(3)).unwrap(), FilterValue::Int(3));
        assert_eq!(
            FilterValue::from_json(&json!(2.5)).unwrap(),
            FilterValue::Float(2.5)
        );
        assert_eq!(
            FilterValue::from_json(&json!("abc")).unwrap(),
            FilterValue::String("abc".to_string())
        );
    }

    #[test]
    fn test_flat_array() {
        let value = FilterValue::from_json(&json!([1, "two", true])).unwrap();
        assert_eq!(
            value,
            FilterValue::Array(vec![
                FilterValue::Int(1),
                FilterValue::String("two".to_string()),
                FilterValue::Bool(true),
            ])
        );
    }

    #[test]
    fn test_rejects_objects_and_nesting() {
        assert!(FilterValue::from_json(&json!({"a": 1})).is_err());
        assert!(FilterValue::from_json(&json!([[1, 2]])).is_err());
    }

    #[test]
    fn test_pattern_text() {
        assert_eq!(FilterValue::Int(1).to_pattern_text(), "1");
        assert_eq!(
            FilterValue::String("seventy %".to_string()).to_pattern_text(),
            "seventy %"
        );
    }
}
