//! Axum router construction for the status server.
//!
//! Assembles the status route with CORS and cache-disabling middleware.
//! Arbitrary dashboards poll this endpoint cross-origin, and every
//! response must reflect live state, so caching is disabled outright.

use std::sync::Arc;

use axum::http::header::{self, HeaderValue};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the Axum router for the status server.
///
/// Routes:
/// - `GET /status` and `GET /status/` -- current status snapshot
///
/// Every response carries `Access-Control-Allow-Origin: *` and
/// cache-disabling headers.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(handler::get_status))
        .route("/status/", get(handler::get_status))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
