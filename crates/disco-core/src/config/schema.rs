//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProviderConfig`, `RelayConfig`, `AdvisorConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credential::Credential;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.disco/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub relay: RelayConfig,
    pub advisor: AdvisorConfig,
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Connection details for the upstream chat-completions provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key. Normally supplied through `OPENROUTER_API_KEY` instead.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    /// Extra HTTP headers sent upstream (e.g. `HTTP-Referer`, `X-Title`).
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub extra_headers: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://openrouter.ai/api/v1".to_string(),
            extra_headers: HashMap::new(),
        }
    }
}

impl ProviderConfig {
    /// The cleaned credential, if one is configured.
    pub fn credential(&self) -> Option<Credential> {
        Credential::new(&self.api_key)
    }

    /// Whether a usable API key is present.
    pub fn is_configured(&self) -> bool {
        self.credential().is_some()
    }

    /// Full chat completions URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

// ─────────────────────────────────────────────
// Retry
// ─────────────────────────────────────────────

/// Same-model retry parameters: attempts, base delay, and growth factor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Total attempts per model (1 = no retry).
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub base_delay_ms: u64,
    /// Factor applied to the delay after each further attempt.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay_ms: 500,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

// ─────────────────────────────────────────────
// Relay
// ─────────────────────────────────────────────

/// Server-side relay settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Route the relay listens on.
    pub path: String,
    /// Model used when the caller does not name one.
    pub default_model: String,
    /// `max_tokens` used when the caller omits it.
    pub max_tokens: u32,
    /// `temperature` used when the caller omits it.
    pub temperature: f64,
    /// Models tried after the requested one. Empty means the relay makes a
    /// single attempt and leaves retries to the caller.
    pub fallback_models: Vec<String>,
    /// Same-model retry policy used when `fallback_models` is non-empty.
    pub retry: RetryConfig,
    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,
    /// Answer CORS preflights and allow any origin.
    pub cors: bool,
    /// Optional directory of static files served on every other path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            path: "/api/openrouter".to_string(),
            default_model: "deepseek/deepseek-r1:free".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            fallback_models: Vec::new(),
            retry: RetryConfig::single_attempt(),
            timeout_secs: 15,
            cors: false,
            static_dir: None,
        }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─────────────────────────────────────────────
// Advisor
// ─────────────────────────────────────────────

/// Client-side orchestration settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvisorConfig {
    /// Relay endpoint the advisor posts to.
    pub relay_url: String,
    /// Candidate models, most preferred first.
    pub models: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub retry: RetryConfig,
    /// Per-attempt timeout in seconds.
    pub timeout_secs: u64,
    /// Extra same-model attempts allowed after an unparseable reply.
    pub parse_retries: u32,
    /// Stop at the first non-transient provider error instead of moving on.
    pub abort_on_fatal: bool,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://127.0.0.1:3000/api/openrouter".to_string(),
            models: vec![
                "deepseek/deepseek-r1:free".to_string(),
                "google/gemini-2.0-flash-exp:free".to_string(),
                "meta-llama/llama-3.2-11b-vision-instruct:free".to_string(),
            ],
            max_tokens: 600,
            temperature: 0.7,
            retry: RetryConfig::default(),
            timeout_secs: 15,
            parse_retries: 0,
            abort_on_fatal: true,
        }
    }
}

impl AdvisorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.relay.port, 3000);
        assert_eq!(config.relay.max_tokens, 500);
        assert_eq!(config.relay.temperature, 0.7);
        assert_eq!(config.relay.retry.max_attempts, 1);
        assert_eq!(config.advisor.models.len(), 3);
        assert_eq!(config.advisor.retry.max_attempts, 2);
        assert!(!config.provider.is_configured());
    }

    #[test]
    fn test_completions_url_trailing_slash() {
        let provider = ProviderConfig {
            api_base: "https://openrouter.ai/api/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            provider.completions_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_whitespace_only_key_is_not_configured() {
        let provider = ProviderConfig {
            api_key: "  \n".to_string(),
            ..Default::default()
        };
        assert!(!provider.is_configured());
    }
}
