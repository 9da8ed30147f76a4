//! HTTP surface: a small axum app over the batch pipeline.
//!
//! Two routes: `GET /` (upload form + conversion history) and
//! `POST /convert-merge` (multipart upload, merged-PDF attachment). The
//! router is a plain function over [`AppState`] so integration tests can
//! drive it with `tower::ServiceExt::oneshot` without binding a socket.

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::DocmergeError;
use crate::history::HistoryLog;

/// Uploads larger than this are rejected by axum before reaching a handler.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub history: Arc<HistoryLog>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let history = HistoryLog::new(&config.history_path);
        Self {
            config: Arc::new(config),
            history: Arc::new(history),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/convert-merge", post(handlers::convert_merge))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Run the HTTP server until the process is stopped.
///
/// Creates the data directories and the history log (with header) up
/// front, binds `0.0.0.0:<port>`, and serves the router.
pub async fn serve(config: ServiceConfig) -> Result<(), DocmergeError> {
    config.ensure_dirs().await?;
    let state = AppState::new(config);
    state.history.ensure_exists().await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DocmergeError::Internal(format!("Failed to bind {addr}: {e}")))?;
    let local = listener
        .local_addr()
        .map_err(|e| DocmergeError::Internal(format!("Failed to read local addr: {e}")))?;
    info!(%local, "docmerge listening");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| DocmergeError::Internal(format!("Server error: {e}")))
}
