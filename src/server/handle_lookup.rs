// Bank and IFSC lookup handlers

use crate::server::ServerState;
use crate::server::error::{bad_request, service_error};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct ByBankQuery {
    pub bank: Option<String>,
}

#[derive(Deserialize)]
pub struct ByIfscQuery {
    pub ifsc: Option<String>,
}

pub async fn handle_banks(State(state): State<ServerState>) -> impl IntoResponse {
    match state.service.list_banks().await {
        Ok(banks) => {
            let body: Vec<_> = banks.into_iter().map(|bank| json!({ "bank": bank })).collect();
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(e) => service_error(&e),
    }
}

pub async fn handle_by_bank(
    State(state): State<ServerState>,
    Query(params): Query<ByBankQuery>,
) -> impl IntoResponse {
    let Some(bank) = params.bank else {
        return bad_request("missing query parameter: bank").into_response();
    };

    log::debug!("[Server] by-bank '{}'", bank);
    match state.service.rows_for_bank(&bank).await {
        Ok(rows) => (StatusCode::OK, axum::Json(rows)).into_response(),
        Err(e) => service_error(&e),
    }
}

pub async fn handle_by_ifsc(
    State(state): State<ServerState>,
    Query(params): Query<ByIfscQuery>,
) -> impl IntoResponse {
    let Some(ifsc) = params.ifsc else {
        return bad_request("missing query parameter: ifsc").into_response();
    };

    log::debug!("[Server] by-ifsc '{}'", ifsc);
    match state.service.row_for_ifsc(&ifsc).await {
        Ok(row) => (StatusCode::OK, axum::Json(row)).into_response(),
        Err(e) => service_error(&e),
    }
}
