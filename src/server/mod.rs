// HTTP server exposing the bank / IFSC lookups
// Handlers are thin: they translate query strings into QueryService calls and
// service errors into status codes.

mod config;
mod error;
mod handle_lookup;
mod handle_root;
mod handle_status;
mod routes;
mod startup;

use crate::service::QueryService;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;

pub use config::ServerConfig;
pub use startup::{StartupConfig, start_server};

pub(crate) use handle_lookup::*;
pub(crate) use handle_root::*;
pub(crate) use handle_status::*;

#[derive(Clone)]
pub struct ServerState {
    pub service: Arc<QueryService>,
    pub config: ServerConfig,
    pub start_time: Instant,
}

pub struct Server {
    service: Arc<QueryService>,
    config: ServerConfig,
    start_time: Instant,
}

impl Server {
    pub fn new(service: Arc<QueryService>, config: ServerConfig) -> Self {
        Self {
            service,
            config,
            start_time: Instant::now(),
        }
    }

    pub fn router(&self) -> Router {
        routes::create_router(
            Arc::clone(&self.service),
            self.config.clone(),
            self.start_time,
        )
    }
}
