//! Request handler for the status endpoint.
//!
//! One route, one handler. The handler builds a fresh snapshot on every
//! request and always answers 200 -- degraded data is the snapshot
//! builder's concern, and response write failures are the connection's
//! problem, never the accept loop's.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::snapshot::build_snapshot;
use crate::state::AppState;

/// `GET /status/` -- serve a fresh status snapshot.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = build_snapshot(
        state.host.as_ref(),
        state.is_ready(),
        state.default_max_players,
    );
    Json(snapshot)
}
