// Route setup and configuration

use crate::server::ServerState;
use crate::server::config::ServerConfig;
use crate::server::{
    handle_banks, handle_by_bank, handle_by_ifsc, handle_health, handle_root, handle_status,
};
use crate::service::QueryService;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

pub fn create_router(
    service: Arc<QueryService>,
    config: ServerConfig,
    start_time: Instant,
) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .route("/banks", get(handle_banks))
        .route("/by-bank", get(handle_by_bank))
        .route("/by-ifsc", get(handle_by_ifsc))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(ServerState {
            service,
            config,
            start_time,
        })
}
