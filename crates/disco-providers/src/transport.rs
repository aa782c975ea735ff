//! Chat transport — posts a chat-completions body and hands back the raw reply.
//!
//! The transport never interprets the body: status and bytes are returned as
//! received so that classification happens in exactly one place
//! ([`crate::outcome::classify_reply`]) no matter which side performs retries.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;
use tracing::{debug, warn};

use disco_core::Credential;

/// Status code and body exactly as the other side sent them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body as text, with invalid UTF-8 replaced. For inspection only.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// A failure below the HTTP layer: no status code was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("could not connect: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// Something that can deliver a chat-completions request body.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post `body` and return the reply, whatever its status.
    async fn send(&self, body: &serde_json::Value) -> Result<RawReply, TransportError>;

    /// Where requests go (for logs).
    fn endpoint(&self) -> &str;
}

// ─────────────────────────────────────────────
// HttpTransport
// ─────────────────────────────────────────────

/// reqwest-backed transport.
///
/// The advisor uses it without a credential to reach the relay; the relay
/// uses it with the provider credential to reach the upstream API.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    credential: Option<Credential>,
    extra_headers: HeaderMap,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("authenticated", &self.credential.is_some())
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport posting to `url` with a per-request `timeout`.
    pub fn new(
        url: impl Into<String>,
        credential: Option<Credential>,
        extra_headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        for (key, value) in extra_headers {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(val)) => {
                    headers.insert(name, val);
                }
                _ => warn!(header = %key, "skipping invalid extra header"),
            }
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            credential,
            extra_headers: headers,
        })
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            return TransportError::Timeout;
        }
        let text = err.to_string();
        let text = match &self.credential {
            Some(cred) => cred.redact(&text),
            None => text,
        };
        if err.is_connect() {
            TransportError::Connect(text)
        } else {
            TransportError::Other(text)
        }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, body: &serde_json::Value) -> Result<RawReply, TransportError> {
        let mut request = self
            .client
            .post(&self.url)
            .headers(self.extra_headers.clone())
            .json(body);
        if let Some(cred) = &self.credential {
            request = request.bearer_auth(cred.expose());
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?.to_vec();

        debug!(url = %self.url, status, bytes = body.len(), "chat reply received");
        Ok(RawReply { status, body })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
