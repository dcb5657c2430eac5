//! Extraction of the JSON payload from free-form model replies.

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use super::report::AnalysisReport;

/// Fenced block patterns, most specific first.
const FENCE_PATTERNS: &[&str] = &[
    r"(?si)```json\s*(.*?)```",
    r"(?s)```[a-zA-Z]*\s*(.*?)```",
];

/// Reply could not be turned into a report.
#[derive(Debug, Error, PartialEq)]
pub enum MalformedResponse {
    #[error("No JSON payload found in model response")]
    NoPayload,

    #[error("Invalid JSON in model response: {0}")]
    InvalidJson(String),

    #[error("Model response JSON is not an object")]
    NotAnObject,
}

/// Picks the candidate JSON text out of a reply.
///
/// The first fenced `json` block wins, then the first fenced block of any
/// kind, then the span from the first `{` to the last `}`. Whichever
/// candidate is selected is final even if it does not parse.
fn candidate(text: &str) -> Option<&str> {
    for pattern in FENCE_PATTERNS {
        let re = match Regex::new(pattern) {
            Ok(r) => r,
            Err(_) => continue,
        };

        if let Some(body) = re.captures(text).and_then(|cap| cap.get(1)) {
            return Some(body.as_str().trim());
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Extracts the JSON object embedded in a model reply.
pub fn extract_json_payload(text: &str) -> Result<Value, MalformedResponse> {
    let json = candidate(text).ok_or(MalformedResponse::NoPayload)?;

    let value: Value =
        serde_json::from_str(json).map_err(|e| MalformedResponse::InvalidJson(e.to_string()))?;

    if !value.is_object() {
        return Err(MalformedResponse::NotAnObject);
    }
    Ok(value)
}

/// Parses a model reply into a typed report.
pub fn parse_report(text: &str) -> Result<AnalysisReport, MalformedResponse> {
    let value = extract_json_payload(text)?;
    serde_json::from_value(value).map_err(|e| MalformedResponse::InvalidJson(e.to_string()))
}
