//! # Filter Expression Tree
//!
//! Boolean expression tree produced by the filter parser and consumed by the
//! predicate compiler.

use std::fmt;

use serde::Serialize;

use super::value::FilterValue;
use crate::config::Connective;

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterOperator {
    /// Equals
    #[serde(rename = "=")]
    Eq,

    /// Not equals
    #[serde(rename = "!=")]
    Neq,

    /// Greater than
    #[serde(rename = ">")]
    Gt,

    /// Greater than or equal
    #[serde(rename = ">=")]
    Gte,

    /// Less than
    #[serde(rename = "<")]
    Lt,

    /// Less than or equal
    #[serde(rename = "<=")]
    Lte,

    /// Pattern match
    #[serde(rename = "LIKE")]
    Like,

    /// Negated pattern match
    #[serde(rename = "NOT LIKE")]
    NotLike,

    /// Case-insensitive pattern match
    #[serde(rename = "ILIKE")]
    ILike,

    /// Value in list
    #[serde(rename = "IN")]
    In,

    /// Value not in list
    #[serde(rename = "NOT IN")]
    NotIn,

    /// Null / boolean test
    #[serde(rename = "IS")]
    Is,

    /// Negated null / boolean test
    #[serde(rename = "IS NOT")]
    IsNot,

    /// Inclusive range
    #[serde(rename = "BETWEEN")]
    Between,
}

impl FilterOperator {
    /// Parse an operator token. Case and inner whitespace are ignored.
    pub fn parse(token: &str) -> Option<Self> {
        let normalized = token
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        let op = match normalized.as_str() {
            "=" => FilterOperator::Eq,
            "!=" => FilterOperator::Neq,
            ">" => FilterOperator::Gt,
            ">=" => FilterOperator::Gte,
            "<" => FilterOperator::Lt,
            "<=" => FilterOperator::Lte,
            "LIKE" => FilterOperator::Like,
            "NOT LIKE" => FilterOperator::NotLike,
            "ILIKE" => FilterOperator::ILike,
            "IN" => FilterOperator::In,
            "NOT IN" => FilterOperator::NotIn,
            "IS" => FilterOperator::Is,
            "IS NOT" => FilterOperator::IsNot,
            "BETWEEN" => FilterOperator::Between,
            _ => return None,
        };
        Some(op)
    }

    /// Canonical operator spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Neq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Like => "LIKE",
            FilterOperator::NotLike => "NOT LIKE",
            FilterOperator::ILike => "ILIKE",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT IN",
            FilterOperator::Is => "IS",
            FilterOperator::IsNot => "IS NOT",
            FilterOperator::Between => "BETWEEN",
        }
    }

    /// SQL spelling, downgrading ILIKE when the engine lacks it
    pub fn to_sql(&self, ilike_disabled: bool) -> &'static str {
        match self {
            FilterOperator::ILike if ilike_disabled => "LIKE",
            other => other.as_str(),
        }
    }

    /// LIKE-family operators get their value wrapped in `%`
    pub fn is_like(&self) -> bool {
        matches!(
            self,
            FilterOperator::Like | FilterOperator::NotLike | FilterOperator::ILike
        )
    }

    /// Operators whose value must be an array
    pub fn expects_list(&self) -> bool {
        matches!(
            self,
            FilterOperator::In | FilterOperator::NotIn | FilterOperator::Between
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `column operator value` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct FilterLeaf {
    pub column: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterLeaf {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }
}

/// Node of the filter expression tree.
///
/// A group's children alternate between content nodes and connectors; a
/// connector is never first, last, or doubled.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Leaf(FilterLeaf),
    Group(Vec<FilterNode>),
    Connector(Connective),
}

impl FilterNode {
    pub fn as_leaf(&self) -> Option<&FilterLeaf> {
        match self {
            FilterNode::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[FilterNode]> {
        match self {
            FilterNode::Group(children) => Some(children),
            _ => None,
        }
    }

    pub fn connective(&self) -> Option<Connective> {
        match self {
            FilterNode::Connector(c) => Some(*c),
            _ => None,
        }
    }

    /// Leaves in input order
    pub fn leaves(&self) -> Vec<&FilterLeaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a FilterLeaf>) {
        match self {
            FilterNode::Leaf(leaf) => out.push(leaf),
            FilterNode::Group(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            FilterNode::Connector(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse() {
        assert_eq!(FilterOperator::parse("like"), Some(FilterOperator::Like));
        assert_eq!(FilterOperator::parse("is  not"), Some(FilterOperator::IsNot));
        assert_eq!(FilterOperator::parse("Not In"), Some(FilterOperator::NotIn));
        assert_eq!(FilterOperator::parse(">="), Some(FilterOperator::Gte));
        assert_eq!(FilterOperator::parse("~="), None);
    }

    #[test]
    fn test_ilike_downgrade() {
        assert_eq!(FilterOperator::ILike.to_sql(false), "ILIKE");
        assert_eq!(FilterOperator::ILike.to_sql(true), "LIKE");
        assert_eq!(FilterOperator::Like.to_sql(true), "LIKE");
    }

    #[test]
    fn test_leaves_in_order() {
        let tree = FilterNode::Group(vec![
            FilterNode::Leaf(FilterLeaf::new("a", FilterOperator::Eq, FilterValue::Int(1))),
            FilterNode::Connector(Connective::Or),
            FilterNode::Group(vec![FilterNode::Leaf(FilterLeaf::new(
                "b",
                FilterOperator::Gt,
                FilterValue::Int(2),
            ))]),
        ]);
        let columns: Vec<_> = tree.leaves().iter().map(|l| l.column.as_str()).collect();
        assert_eq!(columns, vec!["a", "b"]);
    }
}
