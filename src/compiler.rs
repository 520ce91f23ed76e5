//! # Predicate Compiler
//!
//! Walks a filter tree and emits a parameterized SQL predicate. Values are
//! never interpolated: every value becomes a bound `?` parameter, so `%` and
//! `_` inside user data still act as LIKE wildcards but cannot change the
//! predicate's structure.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::filter::{FilterLeaf, FilterNode, FilterOperator, FilterValue};
use crate::errors::{PageError, PageResult};

static IDENTIFIER: OnceLock<Option<Regex>> = OnceLock::new();

fn identifier_pattern() -> Option<&'static Regex> {
    IDENTIFIER
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").ok())
        .as_ref()
}

/// Which columns a request may reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Any well-formed identifier
    #[default]
    PassThrough,
    /// Only the listed identifiers
    AllowList(BTreeSet<String>),
}

impl ColumnPolicy {
    pub fn allow_list<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnPolicy::AllowList(columns.into_iter().map(Into::into).collect())
    }

    /// Check a column name.
    ///
    /// Column names end up in SQL text, so they must be plain dotted
    /// identifiers whatever the policy.
    pub fn check(&self, column: &str) -> PageResult<()> {
        let well_formed = identifier_pattern().is_some_and(|re| re.is_match(column));
        if !well_formed {
            return Err(PageError::forbidden(column));
        }
        match self {
            ColumnPolicy::PassThrough => Ok(()),
            ColumnPolicy::AllowList(allowed) if allowed.contains(column) => Ok(()),
            ColumnPolicy::AllowList(_) => Err(PageError::forbidden(column)),
        }
    }
}

/// Compiled predicate: SQL tokens plus bound parameters in placeholder order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Predicate {
    fragments: Vec<String>,
    params: Vec<FilterValue>,
}

impl Predicate {
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn params(&self) -> &[FilterValue] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Join the fragments into one predicate string.
    ///
    /// No space after an opening paren or before a closing one; fragment
    /// text itself is never rewritten.
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        for fragment in &self.fragments {
            let opens = sql.is_empty() || sql.ends_with('(');
            if !opens && fragment != ")" {
                sql.push(' ');
            }
            sql.push_str(fragment);
        }
        sql
    }

    fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }
}

/// Compiles filter trees under one column policy
#[derive(Debug, Clone)]
pub struct PredicateCompiler<'a> {
    policy: &'a ColumnPolicy,
    ilike_disabled: bool,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(policy: &'a ColumnPolicy, ilike_disabled: bool) -> Self {
        Self {
            policy,
            ilike_disabled,
        }
    }

    /// Compile a root group.
    ///
    /// Each content child of the root becomes its own parenthesized clause so
    /// that top-level connectives never bind into a clause.
    pub fn compile(&self, root: &FilterNode) -> PageResult<Predicate> {
        let mut out = Predicate::default();
        let children = match root {
            FilterNode::Group(children) => children.as_slice(),
            single => std::slice::from_ref(single),
        };

        out.push("(");
        for child in children {
            match child {
                FilterNode::Connector(c) => out.push(c.as_str()),
                node => {
                    out.push("(");
                    self.compile_node(node, &mut out)?;
                    out.push(")");
                }
            }
        }
        out.push(")");

        Ok(out)
    }

    fn compile_node(&self, node: &FilterNode, out: &mut Predicate) -> PageResult<()> {
        match node {
            FilterNode::Connector(c) => out.push(c.as_str()),
            FilterNode::Group(children) => {
                out.push("(");
                for child in children {
                    self.compile_node(child, out)?;
                }
                out.push(")");
            }
            FilterNode::Leaf(leaf) => self.compile_leaf(leaf, out)?,
        }
        Ok(())
    }

    fn compile_leaf(&self, leaf: &FilterLeaf, out: &mut Predicate) -> PageResult<()> {
        self.policy.check(&leaf.column)?;
        let op = leaf.operator.to_sql(self.ilike_disabled);

        match leaf.operator {
            FilterOperator::In | FilterOperator::NotIn => {
                let items = list_items(leaf)?;
                let placeholders = vec!["?"; items.len()].join(", ");
                out.push(format!("{} {} ({})", leaf.column, op, placeholders));
                out.params.extend(items.iter().cloned());
            }
            FilterOperator::Between => match list_items(leaf)? {
                [low, high] => {
                    out.push(format!("{} {} ? AND ?", leaf.column, op));
                    out.params.push(low.clone());
                    out.params.push(high.clone());
                }
                other => {
                    return Err(PageError::malformed(format!(
                        "BETWEEN expects exactly 2 values, got {}",
                        other.len()
                    )))
                }
            },
            FilterOperator::Is | FilterOperator::IsNot if leaf.value.is_null() => {
                out.push(format!("{} {} NULL", leaf.column, op));
            }
            _ => {
                out.push(format!("{} {} ?", leaf.column, op));
                out.params.push(leaf.value.clone());
            }
        }
        Ok(())
    }
}

fn list_items(leaf: &FilterLeaf) -> PageResult<&[FilterValue]> {
    match leaf.value.as_array() {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(PageError::malformed(format!(
            "{} on {} expects a non-empty array",
            leaf.operator, leaf.column
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Connective;
    use crate::filter::parse_filters;
    use serde_json::json;

    fn compile(raw: serde_json::Value, default: Connective) -> PageResult<Predicate> {
        let root = parse_filters(&raw, default)?.expect("non-empty filter");
        PredicateCompiler::new(&ColumnPolicy::PassThrough, false).compile(&root)
    }

    #[test]
    fn test_like_compiles_with_bound_pattern() {
        let predicate = compile(
            json!([["user.average_point", "like", "seventy %"]]),
            Connective::And,
        )
        .unwrap();
        assert_eq!(predicate.to_sql(), "((user.average_point LIKE ?))");
        assert_eq!(
            predicate.params(),
            &[FilterValue::String("%seventy %%".to_string())]
        );
    }

    #[test]
    fn test_to_sql_keeps_fragment_text() {
        let mut predicate = Predicate::default();
        for token in ["(", "(", "note = '( a )'", ")", "AND", "(", "id IN (?, ?)", ")", ")"] {
            predicate.push(token);
        }
        assert_eq!(
            predicate.to_sql(),
            "((note = '( a )') AND (id IN (?, ?)))"
        );
    }

    #[test]
    fn test_fan_with_top_level_or() {
        let predicate = compile(
            json!([["name,email,address", "like", "abc"], ["id", ">", 1]]),
            Connective::Or,
        )
        .unwrap();
        assert_eq!(
            predicate.to_sql(),
            "((((name LIKE ? OR email LIKE ? OR address LIKE ?))) OR (id > ?))"
        );
        assert_eq!(predicate.params().len(), 4);
        assert_eq!(predicate.params()[3], FilterValue::Int(1));
    }

    #[test]
    fn test_params_follow_input_order() {
        let raw = json!([
            ["a", "=", 1],
            ["b", "in", [2, 3]],
            ["OR"],
            ["c", "between", [4, 5]],
            ["d", "!=", 6]
        ]);
        let root = parse_filters(&raw, Connective::And).unwrap().unwrap();
        let predicate = PredicateCompiler::new(&ColumnPolicy::PassThrough, false)
            .compile(&root)
            .unwrap();

        let ints: Vec<i64> = predicate
            .params()
            .iter()
            .map(|p| match p {
                FilterValue::Int(i) => *i,
                other => panic!("unexpected param {:?}", other),
            })
            .collect();
        assert_eq!(ints, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(
            predicate.to_sql(),
            "((a = ?) AND (b IN (?, ?)) OR (c BETWEEN ? AND ?) AND (d != ?))"
        );
    }

    #[test]
    fn test_is_null_has_no_placeholder() {
        let predicate = compile(
            json!([["user.name", "IS NOT", null], ["deleted_at", "is", null]]),
            Connective::And,
        )
        .unwrap();
        assert_eq!(
            predicate.to_sql(),
            "((user.name IS NOT NULL) AND (deleted_at IS NULL))"
        );
        assert!(predicate.params().is_empty());
    }

    #[test]
    fn test_ilike_downgraded_when_disabled() {
        let root = parse_filters(&json!([["title", "ilike", "x"]]), Connective::And)
            .unwrap()
            .unwrap();
        let policy = ColumnPolicy::PassThrough;
        let enabled = PredicateCompiler::new(&policy, false).compile(&root).unwrap();
        let disabled = PredicateCompiler::new(&policy, true).compile(&root).unwrap();
        assert_eq!(enabled.to_sql(), "((title ILIKE ?))");
        assert_eq!(disabled.to_sql(), "((title LIKE ?))");
    }

    #[test]
    fn test_allow_list_rejects_unknown_column() {
        let root = parse_filters(&json!([["password", "=", "x"]]), Connective::And)
            .unwrap()
            .unwrap();
        let policy = ColumnPolicy::allow_list(["id", "title"]);
        let err = PredicateCompiler::new(&policy, false)
            .compile(&root)
            .unwrap_err();
        assert_eq!(err, PageError::ForbiddenColumn("password".to_string()));
    }

    #[test]
    fn test_identifier_rule_applies_without_allow_list() {
        let policy = ColumnPolicy::PassThrough;
        assert!(policy.check("user.name").is_ok());
        assert!(policy.check("_private9").is_ok());
        assert!(policy.check("id; DROP TABLE users").is_err());
        assert!(policy.check("name)").is_err());
        assert!(policy.check("1abc").is_err());
        assert!(policy.check("a..b").is_err());
    }
}
