//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router (health check, viewer WebSocket)
//! - Wire up tracing middleware
//! - Serve until shutdown

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::broadcast::{Broadcaster, RoomHub};
use crate::directory::ChannelDirectory;
use crate::http::websocket::ws_handler;
use crate::lifecycle::Shutdown;
use crate::playback::RoomRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<RoomHub>,
    pub rooms: Arc<RoomRegistry>,
    pub directory: Arc<ChannelDirectory>,
    pub shutdown: Shutdown,
}

/// HTTP server for viewers.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/ws", get(ws_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "viewers": state.hub.total_viewers(),
    }))
}
