//! Reply classification.
//!
//! Providers report failure in several shapes: an HTTP status, a top-level
//! `{"error": {...}}` object (sometimes with a 200), an error embedded in
//! `choices[0].error`, the relay's own `{"error": "...", "detail": "..."}`
//! bodies, or simply an empty completion. [`classify_reply`] is the only code
//! that looks at those shapes; everything downstream matches on [`Outcome`].

use serde_json::Value;

use disco_core::utils::one_line;

use crate::transport::{RawReply, TransportError};

/// Error codes embedded in a reply body that are worth retrying.
const TRANSIENT_CODES: [i64; 4] = [429, 502, 503, 504];

/// Relay body meaning the deployment has no provider credential.
const MISSING_CONFIG: &str = "server_missing_config";

/// Longest snippet of a raw body quoted in a reason.
const SNIPPET_LEN: usize = 200;

/// The result of one provider attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    /// The attempt produced a usable value.
    Success(T),
    /// Likely to succeed on retry (rate limit, 5xx, empty output, network).
    Transient(String),
    /// Will not get better by retrying (bad request, auth, deployment error).
    Fatal(String),
    /// The provider answered, but not in the shape we asked for.
    Parse(String),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Outcome::Transient(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::Fatal(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Outcome::Parse(_))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Transient(_) => "transient",
            Outcome::Fatal(_) => "fatal",
            Outcome::Parse(_) => "parse",
        }
    }

    /// The failure reason, if this is not a success.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Transient(r) | Outcome::Fatal(r) | Outcome::Parse(r) => Some(r),
        }
    }

    /// Chain a step that only runs on success.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Success(v) => f(v),
            Outcome::Transient(r) => Outcome::Transient(r),
            Outcome::Fatal(r) => Outcome::Fatal(r),
            Outcome::Parse(r) => Outcome::Parse(r),
        }
    }
}

/// HTTP statuses worth retrying: 429 and every 5xx.
pub fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Any failure below HTTP (timeout, refused connection, reset) is transient.
pub fn classify_transport_error<T>(err: &TransportError) -> Outcome<T> {
    Outcome::Transient(err.to_string())
}

/// Map a raw chat-completions reply to an outcome carrying the assistant text.
pub fn classify_reply(reply: &RawReply) -> Outcome<String> {
    let parsed: Option<Value> = serde_json::from_slice(&reply.body).ok();

    if let Some(value) = &parsed {
        if value.get("error").and_then(Value::as_str) == Some(MISSING_CONFIG) {
            return Outcome::Fatal(format!(
                "relay has no provider credential configured ({MISSING_CONFIG})"
            ));
        }
    }

    if !reply.is_success() {
        let detail = parsed
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(describe_error)
            .unwrap_or_else(|| snippet(&reply.text()));
        let reason = format!("HTTP {}: {}", reply.status, detail);
        return if is_transient_status(reply.status) {
            Outcome::Transient(reason)
        } else {
            Outcome::Fatal(reason)
        };
    }

    let Some(value) = parsed else {
        return Outcome::Parse(format!("reply is not JSON: {}", snippet(&reply.text())));
    };

    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        return classify_embedded(err, &value);
    }

    let choice = value.get("choices").and_then(|c| c.get(0));
    if let Some(choice) = choice {
        if let Some(err) = choice.get("error").filter(|e| !e.is_null()) {
            return classify_embedded(err, choice);
        }
    }

    match choice
        .and_then(|c| c.pointer("/message/content"))
        .and_then(Value::as_str)
    {
        Some(content) if !content.trim().is_empty() => Outcome::Success(content.to_string()),
        _ => Outcome::Transient("empty completion".to_string()),
    }
}

/// Classify an error object found inside a 2xx body.
fn classify_embedded<T>(err: &Value, parent: &Value) -> Outcome<T> {
    let extra = ["detail", "details"]
        .iter()
        .find_map(|k| parent.get(*k).and_then(Value::as_str));
    let detail = match (describe_error(err), extra) {
        (Some(d), Some(x)) if err.is_string() => format!("{d}: {x}"),
        (Some(d), _) => d,
        (None, Some(x)) => x.to_string(),
        (None, None) => "unknown provider error".to_string(),
    };

    match error_code(err) {
        Some(code) if TRANSIENT_CODES.contains(&code) => {
            Outcome::Transient(format!("provider error {code}: {detail}"))
        }
        Some(code) => Outcome::Fatal(format!("provider error {code}: {detail}")),
        None => Outcome::Fatal(format!("provider error: {detail}")),
    }
}

/// Numeric `code` of an error object (providers send it as number or string).
fn error_code(err: &Value) -> Option<i64> {
    let code = err.get("code")?;
    code.as_i64()
        .or_else(|| code.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Human-readable text for an `error` value in either of its shapes.
fn describe_error(err: &Value) -> Option<String> {
    match err {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| map.get("code").map(|c| c.to_string())),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "(empty body)".to_string()
    } else {
        one_line(trimmed, SNIPPET_LEN)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
