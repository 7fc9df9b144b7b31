//! Total conversion from runtime values to JSON-safe structures.
//!
//! `serialize` never fails and never panics: unrepresentable pieces
//! degrade to placeholder strings, cycles are broken with a sentinel,
//! and a failed field read poisons only that field. Log emission must
//! not be a new source of production failures.

use std::collections::HashSet;

use chrono::SecondsFormat;
use serde_json::Value;

use super::value::RawValue;

/// Sentinel substituted when a value graph loops back on itself.
pub const CIRCULAR_MARKER: &str = "<circular-reference>";

/// Convert a runtime value into a JSON-compatible tree.
///
/// Total function: every input maps to some JSON value. Map key order and
/// sequence element order are preserved.
pub fn serialize(value: &RawValue) -> Value {
    let mut in_progress = HashSet::new();
    serialize_inner(value, &mut in_progress)
}

fn serialize_inner(value: &RawValue, in_progress: &mut HashSet<usize>) -> Value {
    match value {
        RawValue::Null => Value::Null,
        RawValue::Bool(v) => Value::Bool(*v),
        RawValue::Int(v) => Value::from(*v),
        RawValue::UInt(v) => Value::from(*v),
        RawValue::Float(v) => match serde_json::Number::from_f64(*v) {
            Some(n) => Value::Number(n),
            // NaN and infinities have no JSON form
            None => Value::String(v.to_string()),
        },
        RawValue::Str(v) => Value::String(v.clone()),
        RawValue::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::String(text.to_string()),
            Err(_) => Value::String(format!("<binary:{} bytes>", bytes.len())),
        },
        RawValue::DateTime(v) => Value::String(v.to_rfc3339_opts(SecondsFormat::Millis, true)),
        RawValue::Date(v) => Value::String(v.to_string()),
        RawValue::Time(v) => Value::String(v.to_string()),
        RawValue::Uuid(v) => Value::String(v.to_string()),
        RawValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, val)| (key.clone(), serialize_inner(val, in_progress)))
                .collect(),
        ),
        RawValue::Seq(items) => Value::Array(
            items
                .iter()
                .map(|item| serialize_inner(item, in_progress))
                .collect(),
        ),
        RawValue::Entity(source) => {
            let identity = std::sync::Arc::as_ptr(source) as *const () as usize;
            if !in_progress.insert(identity) {
                return Value::String(CIRCULAR_MARKER.to_string());
            }
            let mut map = serde_json::Map::new();
            for (name, field) in source.fields() {
                let serialized = match field {
                    Ok(val) => serialize_inner(&val, in_progress),
                    Err(err) => Value::String(format!("<unserializable:{err}>")),
                };
                map.insert(name, serialized);
            }
            in_progress.remove(&identity);
            Value::Object(map)
        }
        RawValue::Shared(cell) => {
            let identity = std::sync::Arc::as_ptr(cell) as usize;
            if !in_progress.insert(identity) {
                return Value::String(CIRCULAR_MARKER.to_string());
            }
            let serialized = match cell.read() {
                Ok(inner) => serialize_inner(&inner, in_progress),
                Err(_) => Value::String("<unserializable:poisoned>".to_string()),
            };
            in_progress.remove(&identity);
            serialized
        }
        RawValue::Opaque(display) => Value::String(display.to_string()),
    }
}
