//! HTTP API server

use axum::{routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::Settings;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub const PORTAL_INFO_PATH: &str = "/api/portal-info";
pub const HEALTH_PATH: &str = "/health";

/// Build the API router using the provided application state
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route(HEALTH_PATH, get(handlers::health))
        .route(PORTAL_INFO_PATH, get(handlers::portal_info))
        .with_state(state);

    with_error_handling(routes)
}

/// Convenience helper taking validated settings directly
pub fn create_router_from_settings(settings: Settings) -> Router {
    create_router(AppState::new(settings))
}

/// JSON 404 for unmatched routes, JSON 500 for handler panics, request tracing.
pub fn with_error_handling(router: Router) -> Router {
    router
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(TraceLayer::new_for_http())
}
