//! The relay endpoint.
//!
//! Two modes share one contract:
//!
//! - **Single attempt** (no `fallbackModels`): one upstream call; its status
//!   and body go back to the client unchanged. Retrying is the client's job.
//! - **Fallback**: the requested model and then each fallback model are
//!   tried in order. 429/5xx, transport failures, and 2xx bodies carrying a
//!   retryable error code or an empty completion move on to the next model.
//!   Any other reply is returned as-is.
//!
//! Every byte of text that leaves this module, in a response or a log line,
//! has been passed through [`RelayState::redact`].

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use disco_providers::{
    classify_reply, dedup_models, is_transient_status, Outcome, RawReply, RetryPolicy,
};

use crate::normalize::normalize_payload;
use crate::state::{AppState, RelayState};

pub(super) async fn relay(State(state): State<AppState>, body: Bytes) -> Response {
    if state.credential.is_none() {
        error!("relay called without a provider credential; set OPENROUTER_API_KEY");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "server_missing_config" }),
        );
    }

    let payload = match parse_body(&body) {
        Ok(p) => p,
        Err(detail) => {
            warn!(%detail, "rejecting request body");
            return error_response(
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_json", "detail": detail }),
            );
        }
    };

    let upstream_body = normalize_payload(&payload, &state.settings);
    if state.settings.fallback_models.is_empty() {
        forward_once(&state, &upstream_body).await
    } else {
        forward_with_fallback(&state, upstream_body).await
    }
}

pub(super) async fn method_not_allowed(State(state): State<AppState>) -> Response {
    let allow = if state.settings.cors {
        "POST, OPTIONS"
    } else {
        "POST"
    };
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        Json(json!({ "error": "Method not allowed. Use POST." })),
    )
        .into_response()
}

pub(super) async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// An empty body is treated as `{}`; anything else must be a JSON object.
fn parse_body(body: &[u8]) -> Result<Map<String, Value>, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("request body must be a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

async fn forward_once(state: &RelayState, body: &Value) -> Response {
    let model = body["model"].as_str().unwrap_or_default();

    match state.upstream.send(body).await {
        Ok(reply) => {
            info!(model, status = reply.status, "upstream replied");
            passthrough(state, reply)
        }
        Err(e) => {
            let detail = state.redact(&e.to_string());
            warn!(model, error = %detail, "upstream request failed");
            error_response(
                StatusCode::BAD_GATEWAY,
                json!({ "error": "proxy_failed", "detail": detail }),
            )
        }
    }
}

async fn forward_with_fallback(state: &RelayState, body: Value) -> Response {
    let requested = body["model"].as_str().unwrap_or_default();
    let candidates = dedup_models(
        std::iter::once(requested).chain(state.settings.fallback_models.iter().map(String::as_str)),
    );
    let policy = RetryPolicy::from(&state.settings.retry);
    let mut last_failure = String::new();

    for model in &candidates {
        let mut attempt_body = body.clone();
        attempt_body["model"] = Value::String(model.clone());
        let attempt_body = &attempt_body;

        let (outcome, attempts) = policy
            .run(
                model,
                move |_| async move {
                    match state.upstream.send(attempt_body).await {
                        Ok(reply) if is_transient_status(reply.status) => {
                            Outcome::Transient(format!("HTTP {}", reply.status))
                        }
                        Ok(reply) if reply.is_success() => match classify_reply(&reply) {
                            Outcome::Transient(reason) => Outcome::Transient(state.redact(&reason)),
                            _ => Outcome::Success(reply),
                        },
                        Ok(reply) => Outcome::Success(reply),
                        Err(e) => Outcome::Transient(state.redact(&e.to_string())),
                    }
                },
                |outcome, _| outcome.is_transient(),
            )
            .await;

        match outcome {
            Outcome::Success(reply) => {
                info!(model = %model, attempts, status = reply.status, "upstream replied");
                return passthrough(state, reply);
            }
            other => {
                let reason = other.reason().unwrap_or_default();
                warn!(model = %model, attempts, %reason, "upstream failed, trying next model");
                last_failure = format!("{model}: {reason}");
            }
        }
    }

    error!(models = candidates.len(), "all upstream attempts failed");
    error_response(
        StatusCode::BAD_GATEWAY,
        json!({
            "error": "all_providers_failed",
            "message": "All upstream attempts failed.",
            "detail": last_failure,
        }),
    )
}

/// Upstream status and body, unchanged apart from credential redaction.
/// Bodies that are not UTF-8 go back byte-for-byte.
fn passthrough(state: &RelayState, reply: RawReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let body = match String::from_utf8(reply.body) {
        Ok(text) => Body::from(state.redact(&text)),
        Err(e) => Body::from(e.into_bytes()),
    };
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn error_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
