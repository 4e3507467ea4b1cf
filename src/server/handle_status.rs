// Health and status handlers

use crate::server::ServerState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Liveness only; never touches the index.
pub async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, axum::Json(json!({ "status": "ok" })))
}

pub async fn handle_status(State(state): State<ServerState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();
    let index = state.service.status();

    let response = json!({
        "server": {
            "version": state.config.version,
            "uptime_seconds": uptime,
            "warm_index": state.config.warm_index,
        },
        "index": index,
    });

    (StatusCode::OK, axum::Json(response))
}
