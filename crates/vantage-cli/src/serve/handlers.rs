//! HTTP route handlers for the analysis server.
//!
//! Handlers are kept thin: the pipeline lives in `vantage_core`.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info};

use vantage_core::{AnalysisReport, AnalysisRequest};

use super::error::{ApiError, ApiResult};
use super::models::{HealthResponse, Integrations};
use super::AppState;

/// GET `/health` - Liveness plus the configured integrations.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        integrations: Integrations {
            model: state.engine.has_llm(),
            research: state.engine.has_research_agent(),
            attachments: state.engine.has_attachment_source(),
            storage: state.manager.is_enabled(),
        },
    })
}

/// POST `/api/analyze` - Runs a full analysis for the submitted form.
///
/// The body is read as raw bytes so that malformed JSON maps to our own
/// error body instead of axum's plain-text rejection.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<AnalysisReport>> {
    let value: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let request =
        AnalysisRequest::from_value(value).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let segment = request.validate()?;

    info!(
        segment,
        product = request.product(),
        notes_chars = request.notes_len(),
        "Starting analysis"
    );

    let record = state.manager.begin(&request).await;

    let engine = state.engine.clone();
    let task_request = request.clone();
    let mut report = tokio::spawn(async move { engine.analyze(&task_request).await })
        .await
        .map_err(|e| {
            error!(error = %e, "Analysis task aborted");
            ApiError::Internal(e.to_string())
        })?;

    if let Some(record) = record {
        report.analysis_id = state.manager.complete(record, &report).await;
    }

    info!(
        segment = request.segment(),
        analysis_id = report.analysis_id.as_deref().unwrap_or("-"),
        "Analysis finished"
    );

    Ok(Json(report))
}
