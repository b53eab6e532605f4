//! Result records
//!
//! Matches come back from OpenDota as loosely-typed JSON objects. Post-filters
//! inspect them through these helpers.

use serde_json::Value;

use crate::filter::descriptor::ClauseValue;

/// One match record as returned by the data source
pub type MatchRecord = serde_json::Map<String, Value>;

/// JSON truthiness: null, false, 0, "", [] and {} are false, as is a missing field
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// True if `record[field]` is truthy
pub fn field_is_truthy(record: &MatchRecord, field: &str) -> bool {
    is_truthy(record.get(field))
}

/// True if `record[field]` holds `expected`
pub fn field_equals(record: &MatchRecord, field: &str, expected: &ClauseValue) -> bool {
    record
        .get(field)
        .map(|value| expected.matches_json(value))
        .unwrap_or(false)
}
