// Error handling utilities and response helpers

use crate::error::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Helper to create a JSON error response
pub fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, axum::Json(json!({"error": message})))
}

/// Helper for "not found" errors
pub fn not_found(message: &str) -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, message)
}

/// Helper for bad request errors
pub fn bad_request(message: &str) -> impl IntoResponse {
    json_error(StatusCode::BAD_REQUEST, message)
}

/// Helper for internal server errors
pub fn internal_error(message: &str) -> impl IntoResponse {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Map a service error to a response. Only caller mistakes are echoed back;
/// everything else is logged and answered generically.
pub fn service_error(err: &Error) -> Response {
    match err {
        Error::InvalidInput(msg) => bad_request(msg).into_response(),
        Error::NotFound(msg) => not_found(msg).into_response(),
        Error::Build(_)
        | Error::Unavailable(_)
        | Error::Network { .. }
        | Error::SizeExceeded { .. } => {
            log::error!("[Server] Upstream data unavailable: {}", err);
            json_error(StatusCode::SERVICE_UNAVAILABLE, "bank data is temporarily unavailable")
                .into_response()
        }
        _ => {
            log::error!("[Server] Internal error: {}", err);
            internal_error("internal server error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidInput("short".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (Error::Build("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (Error::Read("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(service_error(&err).status(), status, "{:?}", err);
        }
    }
}
