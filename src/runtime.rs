//! Graceful shutdown coordination for the HTTP server and its background warm-up task
use std::future::Future;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Lightweight shutdown coordinator shared by the server and background tasks
#[derive(Clone)]
pub struct ServiceRuntime {
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ServiceRuntime {
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Get a receiver to watch for shutdown signals
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Trigger a programmatic shutdown
    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Future resolving on Ctrl+C or programmatic shutdown, for axum's `with_graceful_shutdown()`
    pub fn create_shutdown_future(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut shutdown_rx = self.shutdown_rx.clone();

        async move {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    log::info!("Shutdown signal (Ctrl+C) received...");
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        log::info!("Shutdown triggered programmatically...");
                    }
                }
            }
        }
    }

    /// Trigger shutdown and abort whatever background work is still running
    pub async fn wait_for_shutdown_cleanup<T: 'static>(&self, service_name: &str, tasks: &mut JoinSet<T>) {
        self.trigger_shutdown();

        if !tasks.is_empty() {
            tasks.abort_all();
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result
                    && !e.is_cancelled()
                {
                    log::error!("Background task error: {}", e);
                }
            }
        }

        log::info!("{} stopped", service_name);
    }
}

impl Default for ServiceRuntime {
    fn default() -> Self {
        Self::new()
    }
}
