//! In-process relay instances for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use disco_core::config::RelayConfig;
use disco_core::Credential;
use disco_providers::HttpTransport;

use crate::state::{AppState, RelayState};

/// Relay state posting to `upstream_url` with an optional key.
pub fn test_state(upstream_url: &str, key: Option<&str>, settings: RelayConfig) -> AppState {
    let credential = key.and_then(Credential::new);
    let upstream = HttpTransport::new(
        upstream_url,
        credential.clone(),
        &HashMap::new(),
        Duration::from_secs(5),
    )
    .unwrap();
    Arc::new(RelayState {
        settings,
        credential,
        upstream: Arc::new(upstream),
    })
}

/// Router with default settings in front of `upstream_url`.
pub fn test_router(upstream_url: &str, key: Option<&str>) -> Router {
    crate::build_router(test_state(upstream_url, key, RelayConfig::default()))
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Full URL of the relay endpoint.
    pub fn relay_url(&self) -> String {
        format!("{}/api/openrouter", self.base_url)
    }
}

/// Spawn the relay on a random port.
pub async fn spawn_test_server(state: AppState) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let app = crate::build_router(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}
