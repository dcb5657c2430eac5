use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisReport, AnalysisRequest};
use crate::status::{AnalysisStatus, StatusError};

/// A persisted analysis.
///
/// Created as `processing` when a request arrives and moved to
/// `completed` once the report is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Store-assigned identifier, set after the first insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Parameters the analysis was requested with
    pub input: AnalysisRequest,
    /// Current lifecycle status
    pub status: AnalysisStatus,
    /// The report, once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Creates a `processing` record for a request.
    pub fn new(input: AnalysisRequest) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            input,
            status: AnalysisStatus::Processing,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches the report and advances to `completed`.
    ///
    /// Fails when the record is already completed.
    pub fn complete(&mut self, report: AnalysisReport) -> Result<(), StatusError> {
        let next = self
            .status
            .next()
            .filter(|next| *next == AnalysisStatus::Completed)
            .ok_or(StatusError::InvalidTransition {
                from: self.status,
                to: AnalysisStatus::Completed,
            })?;

        self.status = next;
        self.result = Some(report);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == AnalysisStatus::Completed
    }
}
