pub mod health;
pub mod relay;

use axum::http::{header, Method};
use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let settings = &state.settings;

    let path = if settings.path.starts_with('/') {
        settings.path.clone()
    } else {
        format!("/{}", settings.path)
    };

    let mut relay_route = post(relay::relay).fallback(relay::method_not_allowed);
    if settings.cors {
        relay_route = relay_route.options(relay::preflight);
    }

    let mut router = Router::new()
        .merge(health::routes())
        .route(&path, relay_route)
        .with_state(state.clone());

    if let Some(dir) = &settings.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    if settings.cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        );
    }

    router
}
