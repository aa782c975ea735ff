//! Config loader — reads `~/.disco/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.disco/config.json`
//! 3. Environment variables `DISCO_<SECTION>__<FIELD>` (override JSON)
//! 4. `OPENROUTER_API_KEY` (overrides any other source of the key)

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::schema::{Config, RetryConfig};
use crate::credential::Credential;

/// Environment variable holding the provider credential.
pub const CREDENTIAL_ENV: &str = "OPENROUTER_API_KEY";

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path (or `path`) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let config = read_config_file(&config_path);
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Read a config file without looking at the environment.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment overrides on top of a loaded config.
///
/// Env var format: `DISCO_<SECTION>__<FIELD>` (double underscore as delimiter).
/// List values (`FALLBACK_MODELS`, `MODELS`) are comma-separated.
///
/// Supported overrides:
/// - `DISCO_PROVIDER__API_KEY`, `DISCO_PROVIDER__API_BASE`
/// - `DISCO_RELAY__HOST`, `DISCO_RELAY__PORT`, `DISCO_RELAY__DEFAULT_MODEL`,
///   `DISCO_RELAY__FALLBACK_MODELS`, `DISCO_RELAY__TIMEOUT_SECS`,
///   `DISCO_RELAY__CORS`, `DISCO_RELAY__STATIC_DIR`
/// - `DISCO_ADVISOR__RELAY_URL`, `DISCO_ADVISOR__MODELS`,
///   `DISCO_ADVISOR__TIMEOUT_SECS`, `DISCO_ADVISOR__RETRY__MAX_ATTEMPTS`,
///   `DISCO_ADVISOR__RETRY__BASE_DELAY_MS`
/// - `OPENROUTER_API_KEY`
fn apply_env_overrides(mut config: Config, env: impl Fn(&str) -> Option<String>) -> Config {
    // Provider. A blank key variable never clears a key from the file.
    let usable_key = |name: &str| env(name).filter(|v| Credential::new(v).is_some());
    if let Some(val) = usable_key("DISCO_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = env("DISCO_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }
    if let Some(val) = usable_key(CREDENTIAL_ENV) {
        config.provider.api_key = val;
    }

    // Relay
    if let Some(val) = env("DISCO_RELAY__HOST") {
        config.relay.host = val;
    }
    if let Some(p) = parse_env(&env, "DISCO_RELAY__PORT") {
        config.relay.port = p;
    }
    if let Some(val) = env("DISCO_RELAY__DEFAULT_MODEL") {
        config.relay.default_model = val;
    }
    if let Some(val) = env("DISCO_RELAY__FALLBACK_MODELS") {
        config.relay.fallback_models = split_list(&val);
    }
    if let Some(n) = parse_env(&env, "DISCO_RELAY__TIMEOUT_SECS") {
        config.relay.timeout_secs = n;
    }
    if let Some(val) = env("DISCO_RELAY__CORS") {
        config.relay.cors = val == "true" || val == "1";
    }
    if let Some(val) = env("DISCO_RELAY__STATIC_DIR") {
        config.relay.static_dir = Some(val);
    }

    // Advisor
    if let Some(val) = env("DISCO_ADVISOR__RELAY_URL") {
        config.advisor.relay_url = val;
    }
    if let Some(val) = env("DISCO_ADVISOR__MODELS") {
        config.advisor.models = split_list(&val);
    }
    if let Some(n) = parse_env(&env, "DISCO_ADVISOR__TIMEOUT_SECS") {
        config.advisor.timeout_secs = n;
    }
    apply_retry_env(&mut config.advisor.retry, &env, "DISCO_ADVISOR__RETRY");

    config
}

fn apply_retry_env(retry: &mut RetryConfig, env: &impl Fn(&str) -> Option<String>, prefix: &str) {
    if let Some(n) = parse_env(env, &format!("{prefix}__MAX_ATTEMPTS")) {
        retry.max_attempts = n;
    }
    if let Some(n) = parse_env(env, &format!("{prefix}__BASE_DELAY_MS")) {
        retry.base_delay_ms = n;
    }
}

fn parse_env<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, "ignoring unparseable environment override");
            None
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
