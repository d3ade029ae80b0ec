//! Redaction of procedure parameters before they reach audit logs.

use serde_json::{Map, Value};

use crate::protocol::Params;

const REDACTED: &str = "[REDACTED]";

/// Key fragments, matched case-insensitively, whose values never reach a log.
const SENSITIVE_KEY_FRAGMENTS: [&str; 8] = [
    "authorization",
    "bearer",
    "api_key",
    "apikey",
    "token",
    "secret",
    "password",
    "credential",
];

/// Only object keys are inspected. Positional values are kept as sent unless
/// they nest an object.
pub fn redact_audit_params(params: Option<&Params>) -> Value {
    match params {
        None => Value::Null,
        Some(Params::Named(map)) => Value::Object(redact_object(map)),
        Some(Params::Positional(items)) => Value::Array(items.iter().map(redact_nested).collect()),
    }
}

fn redact_object(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let value = if is_sensitive_key(key) {
                Value::from(REDACTED)
            } else {
                redact_nested(value)
            };
            (key.clone(), value)
        })
        .collect()
}

fn redact_nested(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(redact_object(map)),
        Value::Array(items) => Value::Array(items.iter().map(redact_nested).collect()),
        other => other.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEY_FRAGMENTS.iter().any(|fragment| key.contains(fragment))
}
