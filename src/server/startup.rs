// Server startup: service construction, optional index warm-up, serve until shutdown

use crate::constants;
use crate::runtime::ServiceRuntime;
use crate::server::{Server, ServerConfig};
use crate::service::{QueryService, ServiceConfig};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Configuration for server startup
pub struct StartupConfig {
    pub service: ServiceConfig,
    pub host: String,
    pub port: u16,
    /// Load or build the index in the background right after binding
    pub warm_index: bool,
}

/// Spawn the warm-up task. Failures are logged; the index is retried on the next query.
fn setup_index_warmup(
    service: &Arc<QueryService>,
    runtime: &ServiceRuntime,
    tasks: &mut JoinSet<()>,
) {
    let service = Arc::clone(service);
    let mut shutdown = runtime.shutdown_signal();

    tasks.spawn(async move {
        tokio::select! {
            result = service.index() => match result {
                Ok(index) => log::info!(
                    "[Server] Index ready: {} banks, {} prefixes",
                    index.banks.len(),
                    index.prefixes.len()
                ),
                Err(e) => log::warn!("[Server] Index warm-up failed: {}", e),
            },
            _ = shutdown.changed() => {
                log::debug!("[Server] Index warm-up cancelled by shutdown");
            }
        }
    });
}

/// Build the service, bind, and serve until Ctrl+C.
pub async fn start_server(config: StartupConfig) -> Result<()> {
    let service = Arc::new(
        QueryService::new(config.service.clone()).context("Failed to create query service")?,
    );

    let addr = format!("{}:{}", config.host, config.port);
    let socket_addr: SocketAddr = addr.parse().context("Invalid address format")?;

    let server_config = ServerConfig {
        version: constants::VERSION.to_string(),
        warm_index: config.warm_index,
    };
    let server = Server::new(Arc::clone(&service), server_config);
    let app = server.router();

    let runtime = ServiceRuntime::new();
    let mut background_tasks = JoinSet::new();

    let listener = tokio::net::TcpListener::bind(socket_addr)
        .await
        .context("Failed to bind to address")?;

    display_server_info(&service, &addr, &config);
    eprintln!("\nPress Ctrl+C to stop\n");

    if config.warm_index {
        setup_index_warmup(&service, &runtime, &mut background_tasks);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(runtime.create_shutdown_future())
        .await
        .context("Server error")?;

    runtime
        .wait_for_shutdown_cleanup("Server", &mut background_tasks)
        .await;

    Ok(())
}

fn display_server_info(service: &QueryService, addr: &str, config: &StartupConfig) {
    let status = service.status();

    eprintln!("{} v{} HTTP server started", constants::BINARY_NAME, constants::VERSION);
    eprintln!("  Listening: http://{}", addr);
    eprintln!("  Listing:   {}", status.listing_url);
    eprintln!("  Index:     {}", status.index_path.display());
    match config.service.index_max_age {
        Some(max_age) => eprintln!(
            "    Max age: {}",
            crate::format::format_duration_verbose(max_age)
        ),
        None => eprintln!("    Max age: unlimited"),
    }
    if config.warm_index {
        eprintln!("  Warm-up:   ENABLED (index loads in the background)");
    } else {
        eprintln!("  Warm-up:   disabled (index loads on first lookup)");
    }
}
