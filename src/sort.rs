//! # Sort and Field Directives
//!
//! `sort=user.name,-id` orders by `user.name ASC, id DESC`;
//! `fields=id,title` restricts the selected columns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ORDER BY term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub column: String,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parse a sort directive; a leading `-` means descending
pub fn parse_sorts(value: &str) -> Vec<SortDirective> {
    let mut sorts = Vec::new();

    for part in value.split(',') {
        let part = part.trim();
        let (column, direction) = match part.strip_prefix('-') {
            Some(rest) => (rest.trim(), SortDirection::Desc),
            None => (part, SortDirection::Asc),
        };
        if column.is_empty() {
            continue;
        }
        sorts.push(SortDirective {
            column: column.to_string(),
            direction,
        });
    }

    sorts
}

/// Parse a field selection list, keeping first occurrences in order
pub fn parse_fields(value: &str) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for field in value.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }
    fields
}
