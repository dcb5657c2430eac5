//! HTTP server exposing the analysis pipeline.
//!
//! # Module Structure
//!
//! - `handlers` - HTTP route handlers
//! - `models` - API response types (DTOs)
//! - `error` - error responses

mod error;
mod handlers;
mod models;

pub use error::{ApiError, ApiResult};
pub use models::{ErrorBody, HealthResponse, Integrations};

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use vantage_core::{AnalysisEngine, AnalysisManager};

/// Shared application state for the server.
pub struct AppState {
    /// Analysis pipeline with its configured collaborators.
    pub engine: Arc<AnalysisEngine>,
    /// Best-effort persistence of analysis records.
    pub manager: AnalysisManager,
}

impl AppState {
    pub fn new(engine: AnalysisEngine, manager: AnalysisManager) -> Self {
        Self {
            engine: Arc::new(engine),
            manager,
        }
    }
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/analyze", post(handlers::analyze))
        .route("/analyze", post(handlers::analyze))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the analysis server and serve until the process stops.
pub async fn start_server(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(address = %listener.local_addr()?, "Vantage server listening");

    axum::serve(listener, app).await
}
