use serde::{Serialize, Deserialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Normalized collection: record id -> record.
pub type Entities = BTreeMap<String, Value>;

/// Separator used when a path is rendered as a single string.
pub const PATH_SEPARATOR: &str = "__.";

/// Dense ordinal of a record inside one engine, assigned in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    pub fn new(id: u32) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

/// String form of a scalar as it appears as a leaf key in the index.
///
/// Nested values are not scalars and yield `None`.
pub fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_key(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Decimal form of a number. Whole floats below 1e21 print without a
/// fraction, so `1.0` and `1` share a key.
pub fn number_key(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            // also folds -0.0 into "0"
            if f == 0.0 { "0".to_string() } else { format!("{:.0}", f) }
        }
        _ => n.to_string(),
    }
}

/// Reads the id field of a record in its string form.
pub fn record_id<'a>(record: &'a Value, key: &str) -> Option<std::borrow::Cow<'a, str>> {
    match record.get(key)? {
        Value::String(s) => Some(std::borrow::Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(std::borrow::Cow::Owned(number_key(n))),
        _ => None,
    }
}
