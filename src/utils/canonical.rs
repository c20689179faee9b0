//! Deterministic JSON canonicalization for signed webhook payloads.
//!
//! Both sides of a webhook exchange must hash the same bytes for the same
//! logical payload. Object keys are therefore re-emitted in byte-wise
//! ascending order at every depth and the result is written as compact JSON.

use serde_json::{Map, Value};

/// Return a copy of `value` with every object's keys in ascending byte order.
///
/// Arrays keep their element order. Scalars and `null` are cloned unchanged.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, child) in entries {
                sorted.insert(key.clone(), canonicalize(child));
            }
            Value::Object(sorted)
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
    }
}

/// Canonicalize `value` and serialize it to compact JSON bytes.
pub fn canonical_json(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&canonicalize(value))
}
