use std::fmt::Display;

use rusqlite::types::Value as DbValue;

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    /// Bound as a JSON array, for use with `json_each`.
    List(Vec<String>),
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text}"),
            Value::Integer(integer) => write!(f, "{integer}"),
            Value::List(list) => write!(f, "[{}]", list.join(", ")),
        }
    }
}

pub fn convert_values(values: Vec<Value>) -> Vec<DbValue> {
    values.into_iter().map(convert_value).collect()
}

fn convert_value(value: Value) -> DbValue {
    match value {
        Value::Text(text) => DbValue::Text(text),
        Value::Integer(integer) => DbValue::Integer(integer),
        Value::List(list) => {
            let items = list
                .into_iter()
                .map(serde_json::Value::String)
                .collect::<Vec<_>>();
            DbValue::Text(serde_json::Value::Array(items).to_string())
        }
    }
}

/// Builds a `SELECT` statement with anonymous `?` placeholders bound in the
/// order the clauses were added.
pub struct Select {
    fields: &'static str,
    table: &'static str,

    wheres: Vec<String>,

    limit: bool,
    offset: bool,

    order_by: Vec<&'static str>,

    values: Vec<Value>,

    count: bool,
}

impl Select {
    pub fn new(fields: &'static str, table: &'static str) -> Self {
        Self {
            fields,
            table,
            wheres: Vec::new(),
            limit: false,
            offset: false,
            order_by: Vec::new(),
            values: Vec::new(),
            count: false,
        }
    }

    pub fn count(table: &'static str) -> Self {
        Self {
            fields: "COUNT(1)",
            table,
            wheres: Vec::new(),
            limit: false,
            offset: false,
            order_by: Vec::new(),
            values: Vec::new(),
            count: true,
        }
    }

    pub fn add_order_by(&mut self, s: &'static str) {
        if self.count {
            return;
        }
        self.order_by.push(s);
    }

    pub fn add_where(&mut self, s: impl ToString, value: Value) {
        self.wheres.push(s.to_string());
        self.values.push(value);
    }

    /// A clause with one placeholder per value, e.g. `(a = ? OR b = ?)`.
    pub fn add_where_values(&mut self, s: impl ToString, values: Vec<Value>) {
        self.wheres.push(s.to_string());
        self.values.extend(values);
    }

    /// Pagination is ignored for count statements.
    pub fn set_page(&mut self, offset: i64, limit: i64) {
        if self.count {
            return;
        }
        self.limit = true;
        self.offset = true;
        self.values.push(Value::Integer(limit));
        self.values.push(Value::Integer(offset));
    }

    pub fn build(self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {} FROM {}", self.fields, self.table);

        if !self.wheres.is_empty() {
            let where_clause = self.wheres.join(" AND ");
            sql.push_str(&format!(" WHERE {}", where_clause));
        }

        if !self.order_by.is_empty() {
            let order_by = self.order_by.join(", ");
            sql.push_str(&format!(" ORDER BY {}", order_by));
        }

        if self.limit {
            sql.push_str(" LIMIT ?");
            if self.offset {
                sql.push_str(" OFFSET ?");
            }
        }

        (sql, self.values)
    }
}

pub struct Update {
    table: &'static str,

    fields: Vec<&'static str>,
    wheres: Vec<String>,
    values: Vec<Value>,
}

impl Update {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            fields: Vec::new(),
            wheres: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn add_field(&mut self, field: &'static str, value: Value) {
        self.fields.push(field);
        self.values.push(value);
    }

    pub fn add_where(&mut self, s: impl ToString, value: Value) {
        self.wheres.push(s.to_string());
        self.values.push(value);
    }

    /// Returns an empty statement when no field was set.
    pub fn build(self) -> (String, Vec<Value>) {
        if self.fields.is_empty() {
            return (String::new(), Vec::new());
        }
        let mut sql = format!("UPDATE {} SET ", self.table);
        let set = self
            .fields
            .iter()
            .map(|f| format!("{} = ?", f))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&set);

        if !self.wheres.is_empty() {
            let where_clause = self.wheres.join(" AND ");
            sql.push_str(&format!(" WHERE {}", where_clause));
        }

        (sql, self.values)
    }
}
