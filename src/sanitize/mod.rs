//! Payload sanitization for audit records.
//!
//! Redacts credential-like values and truncates oversized content before
//! request/response bodies and headers are written to the audit stream.

use serde_json::{Map, Value};

/// Key fragments whose values are redacted from audit records.
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "token",
    "credential",
    "private_key",
    "api_key",
    "authorization",
    "cookie",
    "session",
];

/// Header names whose values are redacted.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "x-api-key"];

/// Maximum length for string values under content-ish keys.
const MAX_STRING_LENGTH: usize = 4096;

/// Keys whose string values are truncated when oversized.
const TRUNCATABLE_KEYS: &[&str] = &["body", "content", "payload", "data"];

/// Replacement for redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Sanitize a serialized payload before emission.
///
/// Redacts values under sensitive keys, truncates oversized strings under
/// content-ish keys, and recurses through nested objects and arrays.
pub fn sanitize_value(value: &Value) -> Value {
    sanitize_inner(value, false)
}

fn sanitize_inner(value: &Value, truncatable: bool) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = Map::new();
            for (key, val) in map {
                let key_lower = key.to_lowercase();
                let is_sensitive = SENSITIVE_KEYS.iter().any(|s| key_lower.contains(s));
                let should_truncate = TRUNCATABLE_KEYS.iter().any(|s| key_lower.contains(s));

                if is_sensitive {
                    sanitized.insert(key.clone(), Value::String(REDACTED.to_string()));
                } else {
                    sanitized.insert(key.clone(), sanitize_inner(val, should_truncate));
                }
            }
            Value::Object(sanitized)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| sanitize_inner(item, truncatable))
                .collect(),
        ),
        Value::String(s) if truncatable && s.len() > MAX_STRING_LENGTH => {
            Value::String(format!("[TRUNCATED - {} bytes]", s.len()))
        }
        _ => value.clone(),
    }
}

/// Copy a header list, redacting credential-bearing headers.
///
/// Always returns an owned copy so the record never aliases the host's
/// live header map after the request completes.
pub fn sanitize_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.to_lowercase();
            if SENSITIVE_HEADERS.iter().any(|h| name_lower == *h) {
                (name.clone(), REDACTED.to_string())
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}
