//! Payload sanitization for the Braze API.
//!
//! Braze rejects nested objects everywhere and rejects array-valued custom
//! event properties, but accepts string-only arrays as user attributes.

use serde_json::{Map, Value};

/// Remove values the Braze API cannot accept from a flat mapping
///
/// Drops nested objects unconditionally. Drops arrays unless
/// `allow_string_arrays` is set and every element is a string. Scalars pass
/// through unchanged. Returns a new mapping; the input is untouched.
pub fn sanitize_properties(
    payload: &Map<String, Value>,
    allow_string_arrays: bool,
) -> Map<String, Value> {
    payload
        .iter()
        .filter(|(_, value)| value_allowed(value, allow_string_arrays))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn value_allowed(value: &Value, allow_string_arrays: bool) -> bool {
    match value {
        Value::Object(_) => false,
        Value::Array(items) => allow_string_arrays && items.iter().all(Value::is_string),
        _ => true,
    }
}
