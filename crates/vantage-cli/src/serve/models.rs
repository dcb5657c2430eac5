//! API response models for the analysis server.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Response for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub integrations: Integrations,
}

/// Which external collaborators are configured.
#[derive(Debug, Serialize)]
pub struct Integrations {
    pub model: bool,
    pub research: bool,
    pub attachments: bool,
    pub storage: bool,
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
