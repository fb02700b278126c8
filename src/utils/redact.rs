//! Redaction for debug logging.
//!
//! Request bodies and headers are only ever logged through these helpers.
//! Values under sensitive keys are replaced with a short hash so that two
//! log lines can still be correlated; long strings (usually base64 media)
//! are truncated.

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Key fragments that mark a field as sensitive (case-insensitive substring match).
pub const SENSITIVE_FIELDS: &[&str] = &[
    "api_key",
    "apikey",
    "key",
    "token",
    "secret",
    "password",
    "credential",
    "authorization",
    "auth",
    "bearer",
    "content",
    "data",
    "image",
    "audio",
];

const MAX_STRING_LEN: usize = 500;
const TRUNCATED_PREFIX_LEN: usize = 100;

fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_FIELDS.iter().any(|field| key.contains(field))
}

/// `[REDACTED:<first 4 bytes of sha256 as hex>]`, or empty for empty input.
pub fn redact(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let digest = Sha256::digest(value.as_bytes());
    let hex: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
    format!("[REDACTED:{hex}]")
}

fn truncate(value: &str) -> String {
    if value.len() <= MAX_STRING_LEN {
        return value.to_string();
    }
    let prefix: String = value.chars().take(TRUNCATED_PREFIX_LEN).collect();
    format!("{prefix}... [TRUNCATED]")
}

/// Copy of `value` with sensitive fields hashed and long strings truncated.
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(redact_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        Value::String(s) => Value::String(truncate(s)),
        other => other.clone(),
    }
}

fn redact_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) if is_sensitive(key) => Value::String(redact(s)),
                other => redact_value(other),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Copy of `headers` as strings, with sensitive header values hashed.
pub fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let raw = value.to_str().unwrap_or("<binary>");
            let shown = if is_sensitive(name.as_str()) {
                redact(raw)
            } else {
                raw.to_string()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

/// Log `value` at debug level under `label`, redacted.
///
/// Serialization is skipped entirely unless debug logging is enabled.
pub fn dump_json<T: Serialize + ?Sized>(label: &str, value: &T) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    match serde_json::to_value(value) {
        Ok(json) => {
            let safe = redact_value(&json);
            let pretty = serde_json::to_string_pretty(&safe).unwrap_or_default();
            tracing::debug!(data = %pretty, "{label}");
        }
        Err(e) => tracing::error!(error = %e, "failed to serialize {label}"),
    }
}
