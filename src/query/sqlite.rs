//! SQLite query handle
//!
//! The FROM expression and default projection come from the developer and
//! are trusted; everything request-derived reaches SQL either as a bound
//! parameter or as an identifier already checked by the column policy.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Map, Number, Value};

use super::QueryHandle;
use crate::filter::FilterValue;
use crate::sort::SortDirective;

/// Query over a `rusqlite::Connection`
#[derive(Debug, Clone)]
pub struct SqliteQuery<'c> {
    conn: &'c Connection,
    from: String,
    columns: Vec<String>,
    predicates: Vec<String>,
    params: Vec<SqlValue>,
    orders: Vec<String>,
    window: Option<(i64, i64)>,
}

impl<'c> SqliteQuery<'c> {
    /// Query `from`, which may be a table name or a join expression
    pub fn new(conn: &'c Connection, from: impl Into<String>) -> Self {
        Self {
            conn,
            from: from.into(),
            columns: vec!["*".to_string()],
            predicates: Vec::new(),
            params: Vec::new(),
            orders: Vec::new(),
            window: None,
        }
    }

    /// Replace the default projection, e.g. `["articles.id AS id", "users.name AS author"]`
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    fn where_clause(&self) -> String {
        if self.predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicates.join(" AND "))
        }
    }

    /// SQL of the count statement
    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}{}", self.from, self.where_clause())
    }

    /// SQL of the fetch statement
    pub fn fetch_sql(&self) -> String {
        let mut sql = format!(
            "SELECT {} FROM {}{}",
            self.columns.join(", "),
            self.from,
            self.where_clause()
        );
        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.orders.join(", "));
        }
        if self.window.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }
        sql
    }
}

impl QueryHandle for SqliteQuery<'_> {
    type Error = rusqlite::Error;

    fn filter(&mut self, predicate: &str, params: &[FilterValue]) {
        self.predicates.push(predicate.to_string());
        self.params.extend(params.iter().map(to_sql_value));
    }

    fn order_by(&mut self, sort: &SortDirective) {
        self.orders
            .push(format!("{} {}", sort.column, sort.direction.as_str()));
    }

    fn select(&mut self, fields: &[String]) {
        self.columns = fields
            .iter()
            .map(|field| format!("{} AS \"{}\"", field, field))
            .collect();
    }

    fn limit_offset(&mut self, limit: i64, offset: i64) {
        self.window = Some((limit, offset));
    }

    fn count(&self) -> Result<i64, Self::Error> {
        self.conn.query_row(
            &self.count_sql(),
            params_from_iter(self.params.iter().cloned()),
            |row| row.get(0),
        )
    }

    fn fetch(&self) -> Result<Vec<Value>, Self::Error> {
        let mut params = self.params.clone();
        if let Some((limit, offset)) = self.window {
            params.push(SqlValue::Integer(limit));
            params.push(SqlValue::Integer(offset));
        }

        let mut stmt = self.conn.prepare(&self.fetch_sql())?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                let mut record = Map::with_capacity(names.len());
                for (idx, name) in names.iter().enumerate() {
                    record.insert(name.clone(), to_json(row.get_ref(idx)?));
                }
                Ok(Value::Object(record))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

fn to_sql_value(value: &FilterValue) -> SqlValue {
    match value {
        FilterValue::Null => SqlValue::Null,
        FilterValue::Bool(b) => SqlValue::Integer(i64::from(*b)),
        FilterValue::Int(i) => SqlValue::Integer(*i),
        FilterValue::Float(f) => SqlValue::Real(*f),
        FilterValue::String(s) => SqlValue::Text(s.clone()),
        FilterValue::Array(_) => SqlValue::Text(value.to_pattern_text()),
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(STANDARD.encode(bytes)),
    }
}
