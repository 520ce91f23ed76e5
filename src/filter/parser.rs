//! # Filter Grammar Parser
//!
//! Turns the array-of-arrays filter syntax into a `FilterNode` tree:
//!
//! ```text
//! [["name,email","like","abc"],["OR"],["id",">",1]]
//! ```
//!
//! Each inner array is a `[column, operator, value]` clause, a `["AND"]` /
//! `["OR"]` connector, or itself an array of arrays (an explicit sub-group).

use serde_json::Value;

use super::ast::{FilterLeaf, FilterNode, FilterOperator};
use super::value::FilterValue;
use crate::config::Connective;
use crate::errors::{PageError, PageResult};

/// Decode the raw `filters` parameter into JSON.
///
/// The parameter arrives either already decoded (JSON bodies) or as a string
/// holding JSON (query strings). Blank and null inputs mean "no filter".
pub fn decode_filters(raw: &Value) -> PageResult<Option<Value>> {
    match raw {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => serde_json::from_str::<Value>(s)
            .map(Some)
            .map_err(|e| PageError::malformed(format!("filters are not valid JSON: {}", e))),
        other => Ok(Some(other.clone())),
    }
}

/// Parse a decoded filter value into a root group.
///
/// `default` is inserted between sibling clauses that have no explicit
/// connector. Returns `None` for an empty filter.
pub fn parse_filters(raw: &Value, default: Connective) -> PageResult<Option<FilterNode>> {
    let items = match raw {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        Value::String(_) => {
            return match decode_filters(raw)? {
                Some(Value::String(_)) => Err(PageError::malformed("filters must be an array")),
                Some(decoded) => parse_filters(&decoded, default),
                None => Ok(None),
            };
        }
        _ => return Err(PageError::malformed("filters must be an array")),
    };

    if items.is_empty() {
        return Ok(None);
    }

    // A bare clause such as ["id", "=", 1]
    let children = if items[0].is_string() {
        parse_group(std::slice::from_ref(raw), default)?
    } else {
        parse_group(items, default)?
    };

    if children.is_empty() {
        return Ok(None);
    }
    Ok(Some(FilterNode::Group(children)))
}

fn parse_group(items: &[Value], default: Connective) -> PageResult<Vec<FilterNode>> {
    let mut children: Vec<FilterNode> = Vec::with_capacity(items.len() * 2);

    for item in items {
        let parts = item
            .as_array()
            .ok_or_else(|| PageError::malformed(format!("expected an array, got {}", item)))?;

        if let Some(connective) = as_connector(parts) {
            match children.last() {
                None => {
                    return Err(PageError::malformed(format!(
                        "{} cannot start a group",
                        connective
                    )))
                }
                Some(FilterNode::Connector(_)) => {
                    return Err(PageError::malformed(format!(
                        "{} follows another connector",
                        connective
                    )))
                }
                Some(_) => children.push(FilterNode::Connector(connective)),
            }
            continue;
        }

        let node = if parts.first().is_some_and(Value::is_array) {
            let nested = parse_group(parts, default)?;
            if nested.is_empty() {
                continue;
            }
            FilterNode::Group(nested)
        } else {
            parse_clause(parts)?
        };

        if matches!(children.last(), Some(last) if last.connective().is_none()) {
            children.push(FilterNode::Connector(default));
        }
        children.push(node);
    }

    if let Some(FilterNode::Connector(c)) = children.last() {
        return Err(PageError::malformed(format!("{} cannot end a group", c)));
    }

    Ok(children)
}

fn as_connector(parts: &[Value]) -> Option<Connective> {
    match parts {
        [Value::String(token)] => Connective::parse(token),
        _ => None,
    }
}

fn parse_clause(parts: &[Value]) -> PageResult<FilterNode> {
    let [column, operator, value] = parts else {
        return Err(PageError::malformed(format!(
            "expected [column, operator, value], got {} elements",
            parts.len()
        )));
    };

    let column = column
        .as_str()
        .ok_or_else(|| PageError::malformed(format!("column must be a string, got {}", column)))?;
    let operator_token = operator
        .as_str()
        .ok_or_else(|| PageError::malformed(format!("operator must be a string, got {}", operator)))?;
    let operator = FilterOperator::parse(operator_token)
        .ok_or_else(|| PageError::malformed(format!("unknown operator: {}", operator_token)))?;

    let value = clause_value(operator, FilterValue::from_json(value)?)?;

    let columns: Vec<&str> = column
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    match columns.as_slice() {
        [] => Err(PageError::malformed("column must not be empty")),
        [single] => Ok(FilterNode::Leaf(FilterLeaf::new(*single, operator, value))),
        many => {
            let mut fan = Vec::with_capacity(many.len() * 2 - 1);
            for (i, name) in many.iter().enumerate() {
                if i > 0 {
                    fan.push(FilterNode::Connector(Connective::Or));
                }
                fan.push(FilterNode::Leaf(FilterLeaf::new(*name, operator, value.clone())));
            }
            // clause wrapper around the fan-out
            Ok(FilterNode::Group(vec![FilterNode::Group(fan)]))
        }
    }
}

/// Check the value shape for the operator and apply LIKE wrapping
fn clause_value(operator: FilterOperator, value: FilterValue) -> PageResult<FilterValue> {
    if operator.expects_list() {
        let items = value.as_array().ok_or_else(|| {
            PageError::malformed(format!("{} expects an array value", operator))
        })?;
        if items.is_empty() {
            return Err(PageError::malformed(format!("{} expects a non-empty array", operator)));
        }
        if operator == FilterOperator::Between && items.len() != 2 {
            return Err(PageError::malformed(format!(
                "BETWEEN expects exactly 2 values, got {}",
                items.len()
            )));
        }
        return Ok(value);
    }

    if value.as_array().is_some() {
        return Err(PageError::malformed(format!("{} expects a scalar value", operator)));
    }

    if operator.is_like() {
        if value.is_null() {
            return Err(PageError::malformed(format!("{} expects a non-null value", operator)));
        }
        return Ok(FilterValue::String(format!("%{}%", value.to_pattern_text())));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: Value) -> PageResult<Option<FilterNode>> {
        parse_filters(&raw, Connective::And)
    }

    #[test]
    fn test_like_value_is_wrapped() {
        let root = parse(json!([["user.average_point", "like", "seventy %"]]))
            .unwrap()
            .unwrap();
        let leaves = root.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].column, "user.average_point");
        assert_eq!(leaves[0].operator, FilterOperator::Like);
        assert_eq!(leaves[0].value, FilterValue::String("%seventy %%".to_string()));
    }

    #[test]
    fn test_comma_fan_shape() {
        let root = parse(json!([["name,email,address", "like", "abc"]]))
            .unwrap()
            .unwrap();

        let top = root.children().unwrap();
        assert_eq!(top.len(), 1);
        let wrapper = top[0].children().unwrap();
        assert_eq!(wrapper.len(), 1);
        let contents = wrapper[0].children().unwrap();
        assert_eq!(contents.len(), 5);

        let names = ["name", "email", "address"];
        for (i, name) in names.iter().enumerate() {
            let leaf = contents[i * 2].as_leaf().unwrap();
            assert_eq!(leaf.column, *name);
            assert_eq!(leaf.operator, FilterOperator::Like);
            assert_eq!(leaf.value, FilterValue::String("%abc%".to_string()));
        }
        assert_eq!(contents[1].connective(), Some(Connective::Or));
        assert_eq!(contents[3].connective(), Some(Connective::Or));
    }

    #[test]
    fn test_default_connective_inserted() {
        let root = parse_filters(
            &json!([["a", "=", 1], ["b", "=", 2], ["OR"], ["c", "=", 3]]),
            Connective::And,
        )
        .unwrap()
        .unwrap();
        let children = root.children().unwrap();
        assert_eq!(children.len(), 5);
        assert_eq!(children[1].connective(), Some(Connective::And));
        assert_eq!(children[3].connective(), Some(Connective::Or));
    }

    #[test]
    fn test_string_input_is_decoded() {
        let root = parse(json!(r#"[["id", ">", 1]]"#)).unwrap().unwrap();
        assert_eq!(root.leaves()[0].value, FilterValue::Int(1));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(parse(json!(null)).unwrap().is_none());
        assert!(parse(json!("")).unwrap().is_none());
        assert!(parse(json!([])).unwrap().is_none());
    }

    #[test]
    fn test_bare_clause() {
        let root = parse(json!(["status", "=", "active"])).unwrap().unwrap();
        assert_eq!(root.leaves().len(), 1);
    }

    #[test]
    fn test_nested_group() {
        let root = parse(json!([
            ["a", "=", 1],
            [["b", "=", 2], ["OR"], ["c", "=", 3]]
        ]))
        .unwrap()
        .unwrap();
        let children = root.children().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[2].children().unwrap().len(), 3);
    }

    #[test]
    fn test_malformed_inputs() {
        let cases = vec![
            json!("not json"),
            json!({"a": 1}),
            json!([["a", "="]]),
            json!([[1, "=", 1]]),
            json!([["a", "~~", 1]]),
            json!([["a", "in", 1]]),
            json!([["a", "between", [1]]]),
            json!([["a", "=", [1, 2]]]),
            json!([["a", "=", {"x": 1}]]),
            json!([["AND"], ["a", "=", 1]]),
            json!([["a", "=", 1], ["OR"]]),
            json!([["a", "=", 1], ["OR"], ["AND"], ["b", "=", 1]]),
            json!([" , ", "=", 1]),
        ];
        for case in cases {
            let err = parse(case.clone()).unwrap_err();
            assert!(
                matches!(err, PageError::MalformedFilter(_)),
                "expected malformed for {}",
                case
            );
        }
    }

    #[test]
    fn test_in_and_between() {
        let root = parse(json!([["id", "in", [1, 2, 3]], ["age", "between", [18, 65]]]))
            .unwrap()
            .unwrap();
        let leaves = root.leaves();
        assert_eq!(leaves[0].operator, FilterOperator::In);
        assert_eq!(leaves[0].value.as_array().unwrap().len(), 3);
        assert_eq!(leaves[1].operator, FilterOperator::Between);
    }
}
