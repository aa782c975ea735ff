//! Decision Disco relay — the server-side boundary that holds the provider
//! credential.
//!
//! Clients post a chat-completions body to `POST /api/openrouter` (path is
//! configurable). The relay normalizes it, injects the credential, forwards
//! it upstream, and hands the upstream status and body back unchanged.

pub mod normalize;
mod routes;
pub mod state;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

pub use normalize::normalize_payload;
pub use routes::build_router;
pub use state::{AppState, RelayState};

/// Serve the relay on `listener` until Ctrl+C.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(
        %addr,
        path = %state.settings.path,
        fallback_models = state.settings.fallback_models.len(),
        "relay listening"
    );

    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down relay");
        })
        .await?;
    Ok(())
}
