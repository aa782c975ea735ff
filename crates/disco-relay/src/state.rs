//! Shared relay state.

use std::sync::Arc;

use disco_core::config::{Config, RelayConfig};
use disco_core::Credential;
use disco_providers::{ChatTransport, HttpTransport, TransportError};

pub struct RelayState {
    pub settings: RelayConfig,
    /// `None` means the deployment is misconfigured; requests get a 500.
    pub credential: Option<Credential>,
    pub upstream: Arc<dyn ChatTransport>,
}

pub type AppState = Arc<RelayState>;

impl std::fmt::Debug for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayState")
            .field("path", &self.settings.path)
            .field("upstream", &self.upstream.endpoint())
            .field("credential", &self.credential.is_some())
            .finish()
    }
}

impl RelayState {
    /// Build state from a loaded config, posting upstream over HTTP.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let credential = config.provider.credential();
        let upstream = HttpTransport::new(
            config.provider.completions_url(),
            credential.clone(),
            &config.provider.extra_headers,
            config.relay.timeout(),
        )?;
        Ok(Self {
            settings: config.relay.clone(),
            credential,
            upstream: Arc::new(upstream),
        })
    }

    /// Strip the credential out of any text headed for a client or a log.
    pub fn redact(&self, text: &str) -> String {
        match &self.credential {
            Some(cred) => cred.redact(text),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_without_key() {
        let state = RelayState::from_config(&Config::default()).unwrap();
        assert!(state.credential.is_none());
        assert_eq!(state.upstream.endpoint(), "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn test_debug_and_redact_hide_key() {
        let mut config = Config::default();
        config.provider.api_key = "sk-or-v1-abc".to_string();
        let state = RelayState::from_config(&config).unwrap();

        assert!(!format!("{state:?}").contains("sk-or-v1-abc"));
        assert_eq!(state.redact("bad key sk-or-v1-abc"), "bad key ***");
    }
}
