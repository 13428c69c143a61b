//! Main webserver implementation
//!
//! The router is built around a shared `WebServerState` holding the tracker
//! handle; `run` serves it until Ctrl+C or a shutdown message.

use axum::{
    routing::{get, post},
    Router,
};
use shared::{logging, process_error, process_info, ProcessId};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracker::TrackerHandle;

use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;
use crate::web::handlers::api;

/// HTTP front-end over a running tracker
pub struct WebServer {
    state: Arc<WebServerState>,

    /// Shutdown signal
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl WebServer {
    pub fn new(bind_address: SocketAddr, tracker: TrackerHandle, backend: impl Into<String>) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        Self {
            state: Arc::new(WebServerState::new(bind_address, tracker, backend)),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            // API routes
            .route("/api/records", get(api::list_records).post(api::create_record))
            .route("/api/records/:id", get(api::get_record))
            .route("/api/groups", get(api::list_groups))
            .route("/api/dispatches", get(api::list_dispatches).post(api::create_dispatch))
            .route("/api/stats", get(api::get_stats))
            .route("/api/report", get(api::get_report))
            .route("/api/reload", post(api::reload))
            // Health check
            .route("/health", get(api::health_check))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .into_inner(),
            )
            .with_state(self.state.clone())
    }

    pub fn get_shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Serve until a shutdown message or Ctrl+C
    pub async fn run(mut self) -> WebServerResult<()> {
        let router = self.build_router();
        let address = self.state.bind_address;

        let listener = tokio::net::TcpListener::bind(address)
            .await
            .map_err(|e| WebServerError::ServerStartup(format!("Failed to bind to {}: {}", address, e)))?;

        process_info!(ProcessId::current(), "🌐 API listening on http://{}", address);

        let server_task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                process_error!(ProcessId::current(), "❌ Server error: {}", e);
            }
        });

        tokio::select! {
            _ = server_task => {
                process_info!(ProcessId::current(), "HTTP server task completed");
            },
            _ = self.shutdown_rx.recv() => {
                logging::log_shutdown(ProcessId::current(), "webserver received shutdown signal");
            },
            _ = tokio::signal::ctrl_c() => {
                logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal");
            }
        }

        Ok(())
    }

    /// Get server state for external access
    pub fn state(&self) -> &Arc<WebServerState> {
        &self.state
    }
}
