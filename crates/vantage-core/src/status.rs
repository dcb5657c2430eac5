use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a persisted analysis.
///
/// Records move in one direction only:
/// Processing → Completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// Submitted, report not yet produced
    #[default]
    Processing,
    /// Report produced and stored
    Completed,
}

impl AnalysisStatus {
    /// Returns the next status in the lifecycle.
    /// Returns None if already completed.
    pub fn next(&self) -> Option<AnalysisStatus> {
        match self {
            AnalysisStatus::Processing => Some(AnalysisStatus::Completed),
            AnalysisStatus::Completed => None,
        }
    }

    /// Returns true if this status can transition further.
    pub fn can_advance(&self) -> bool {
        self.next().is_some()
    }

    /// Wire value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: AnalysisStatus,
        to: AnalysisStatus,
    },
}
