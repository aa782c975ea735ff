//! Client payload normalization.
//!
//! The relay never forwards the client's body as-is: it rebuilds a
//! chat-completions body from the fields it understands and fills in
//! defaults for anything missing or unusable.

use serde_json::{json, Map, Value};

use disco_core::config::RelayConfig;

/// Build the upstream body from a client payload.
///
/// - `model`: non-empty string, else the configured default
/// - `messages`: array, else `[]`
/// - `max_tokens`: positive integer, else the configured default
/// - `temperature`: any number, else the configured default
/// - `stream`: always `false`
pub fn normalize_payload(payload: &Map<String, Value>, settings: &RelayConfig) -> Value {
    let model = payload
        .get("model")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(&settings.default_model);

    let messages = payload
        .get("messages")
        .filter(|m| m.is_array())
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));

    let max_tokens = payload
        .get("max_tokens")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .unwrap_or(u64::from(settings.max_tokens));

    let temperature = payload
        .get("temperature")
        .and_then(Value::as_f64)
        .unwrap_or(settings.temperature);

    json!({
        "model": model,
        "messages": messages,
        "max_tokens": max_tokens,
        "temperature": temperature,
        "stream": false,
    })
}
