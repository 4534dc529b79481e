//! Integration tests for the status endpoint.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic, routing, and
//! response headers without needing a live network connection.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use stormwatch_core::host::FixedWorldHost;
use stormwatch_observer::router::build_router;
use stormwatch_observer::state::AppState;
use tower::ServiceExt;

fn make_state(host: Arc<FixedWorldHost>, ready: bool) -> Arc<AppState> {
    let state = Arc::new(AppState::new(host, 32));
    if ready {
        state.mark_ready();
    }
    state
}

async fn get(state: Arc<AppState>, path: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = build_router(state)
        .oneshot(
            Request::builder()
                .uri(path)
                .header("origin", "http://dashboard.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

#[tokio::test]
async fn status_reflects_host_state() {
    let host = Arc::new(FixedWorldHost::new());
    host.set_players(["A", "B"]);
    host.set_pretty_date("June 5, year 2, 09:00");

    let (status, _, json) = get(make_state(host, true), "/status/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["online"], true);
    assert_eq!(json["playerCount"], 2);
    assert_eq!(json["maxPlayers"], 32);
    assert_eq!(json["players"], serde_json::json!(["A", "B"]));
    assert_eq!(json["prettyDate"], "June 5, year 2, 09:00");
    assert_eq!(json["temporalStorm"], false);
}

#[tokio::test]
async fn status_without_trailing_slash_also_routes() {
    let host = Arc::new(FixedWorldHost::new());
    let (status, _, json) = get(make_state(host, true), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn storm_state_is_reported() {
    let host = Arc::new(FixedWorldHost::new());
    host.set_storm_active(true);
    let (_, _, json) = get(make_state(host, true), "/status/").await;
    assert_eq!(json["temporalStorm"], true);
}

#[tokio::test]
async fn initializing_placeholder_before_ready() {
    let host = Arc::new(FixedWorldHost::new());
    host.set_players(["A"]);
    let (status, _, json) = get(make_state(host, false), "/status/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "initializing");
    assert_eq!(json["online"], false);
    assert_eq!(json["playerCount"], 0);
}

#[tokio::test]
async fn failing_host_degrades_but_still_answers_200() {
    let host = Arc::new(FixedWorldHost::new());
    host.set_players(["A", "B"]);
    host.set_failing(true);
    let (status, _, json) = get(make_state(host, true), "/status/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["playerCount"], 0);
    assert_eq!(json["temporalStorm"], false);
}

#[tokio::test]
async fn response_headers_allow_cross_origin_and_disable_caching() {
    let host = Arc::new(FixedWorldHost::new());
    let (_, headers, _) = get(make_state(host, true), "/status/").await;

    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(
        headers.get("cache-control").and_then(|v| v.to_str().ok()),
        Some("no-store, no-cache, must-revalidate")
    );
    assert_eq!(
        headers.get("pragma").and_then(|v| v.to_str().ok()),
        Some("no-cache")
    );
    assert_eq!(
        headers.get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let host = Arc::new(FixedWorldHost::new());
    let (status, _, _) = get(make_state(host, true), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
