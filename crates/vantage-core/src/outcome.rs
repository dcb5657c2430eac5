//! Result of an enrichment step that may have fallen back to heuristics.

use serde::{Deserialize, Serialize};

/// Where a value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Provenance {
    /// Produced by the external service as intended.
    Live,
    /// Produced locally because the service was absent or failed.
    Heuristic { reason: String },
}

/// A value together with its [`Provenance`].
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Outcome<T> {
    pub fn live(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Live,
        }
    }

    pub fn heuristic(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            provenance: Provenance::Heuristic {
                reason: reason.into(),
            },
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.provenance, Provenance::Heuristic { .. })
    }

    /// The fallback reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match &self.provenance {
            Provenance::Live => None,
            Provenance::Heuristic { reason } => Some(reason),
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}
