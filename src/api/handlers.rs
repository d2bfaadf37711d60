//! API handlers

use std::any::Any;

use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::AppState;
use crate::error::{Error, Result};
use crate::resolver::{resolve_installer_url, RequestContext};
use crate::types::{HealthResponse, PortalInfo};

/// Liveness probe, no authentication
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Current release metadata, gated by `X-API-Key`
pub async fn portal_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<PortalInfo>> {
    let ctx = RequestContext::from_parts(&headers, &uri);
    let settings = &state.settings;

    if !settings.api_key.matches(ctx.api_key.as_deref()) {
        tracing::warn!(
            key_present = ctx.api_key.as_deref().is_some_and(|k| !k.is_empty()),
            "Rejected portal-info request"
        );
        return Err(Error::Unauthorized);
    }

    let installer_url = resolve_installer_url(&settings.installer, &ctx);
    if installer_url.is_empty() {
        tracing::warn!("No installer URL could be derived for this request");
    }

    tracing::debug!(%installer_url, version = %settings.release.version, "Serving portal info");

    Ok(Json(PortalInfo::new(&settings.release, installer_url)))
}

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> Error {
    tracing::debug!(%uri, "No route matched");
    Error::NotFound
}

/// Converts a handler panic into the generic 500 envelope
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    Error::internal(format!("handler panicked: {detail}")).into_response()
}
