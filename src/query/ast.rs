use serde_json::{Map, Value};
use crate::core::error::{Error, Result};
use crate::core::types::stringify;
use crate::query::matcher::Pattern;

/// One sub-query: a nested mapping that mirrors the shape of a record.
///
/// All leaves of a sub-query must match for a record to be selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub fields: Vec<(String, QueryValue)>,
}

/// Value found under a query key.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Exact match against the stringified record value.
    Literal(String),
    /// Match every value key accepted by the pattern.
    Pattern(Pattern),
    /// Descend one level further.
    Nested(Query),
}

impl Query {
    pub fn new() -> Self {
        Query { fields: Vec::new() }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Adds a pattern leaf, failing when `pattern` is not valid `/body/flags` syntax.
    pub fn with_pattern(self, key: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(self.with(key, QueryValue::pattern(pattern)?))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Parses a JSON object into one sub-query.
    pub fn from_value(value: &Value) -> Result<Query> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(Error::invalid_input(format!(
                "query must be an object, got {}", other
            ))),
        }
    }

    /// Parses a JSON object or an array of objects into a list of sub-queries.
    pub fn parse(value: &Value) -> Result<Vec<Query>> {
        match value {
            Value::Array(items) => items.iter().map(Self::from_value).collect(),
            other => Ok(vec![Self::from_value(other)?]),
        }
    }

    pub fn parse_str(text: &str) -> Result<Vec<Query>> {
        let value: Value = serde_json::from_str(text)?;
        Self::parse(&value)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Query> {
        let fields = map
            .iter()
            .map(|(key, value)| Ok((key.clone(), QueryValue::from_json(value)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Query { fields })
    }
}

impl QueryValue {
    /// Compiles an explicit pattern leaf.
    pub fn pattern(text: &str) -> Result<QueryValue> {
        match Pattern::parse(text)? {
            Some(pattern) => Ok(QueryValue::Pattern(pattern)),
            None => Err(Error::invalid_pattern(format!(
                "{:?} is not of the form /pattern/flags", text
            ))),
        }
    }

    /// Converts a JSON query value, treating `/body/flags` strings as patterns.
    pub fn from_json(value: &Value) -> Result<QueryValue> {
        match value {
            Value::String(s) => Ok(match Pattern::parse(s)? {
                Some(pattern) => QueryValue::Pattern(pattern),
                None => QueryValue::Literal(s.clone()),
            }),
            Value::Object(map) => Ok(QueryValue::Nested(Query::from_map(map)?)),
            Value::Array(items) => {
                // lists are addressed by position, like records
                let fields = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| Ok((i.to_string(), QueryValue::from_json(item)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(QueryValue::Nested(Query { fields }))
            }
            scalar => stringify(scalar)
                .map(QueryValue::Literal)
                .ok_or_else(|| Error::invalid_input(format!("unsupported query value {}", scalar))),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Literal(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Literal(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Literal(value.to_string())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        match stringify(&Value::from(value)) {
            Some(s) => QueryValue::Literal(s),
            None => QueryValue::Literal("null".to_string()),
        }
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Literal(value.to_string())
    }
}

impl From<Pattern> for QueryValue {
    fn from(value: Pattern) -> Self {
        QueryValue::Pattern(value)
    }
}

impl From<Query> for QueryValue {
    fn from(value: Query) -> Self {
        QueryValue::Nested(value)
    }
}
