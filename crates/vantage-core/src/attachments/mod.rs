//! Attachment text collected for a session.
//!
//! Uploads and extraction happen in a separate service; this module only
//! reads what it extracted and bounds how much of it reaches the prompt.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::lenient;
use crate::config::AttachmentConfig;

/// Errors from the attachment service.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Attachment service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid attachment service URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid session id: {0:?}")]
    InvalidSession(String),
}

impl From<reqwest::Error> for AttachmentError {
    fn from(err: reqwest::Error) -> Self {
        AttachmentError::Network(err.to_string())
    }
}

/// A file uploaded in a session, with its extracted text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, deserialize_with = "lenient::text")]
    pub session_id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub extracted_content: String,
    #[serde(default = "unknown_type", deserialize_with = "lenient::text")]
    pub file_type: String,
}

fn unknown_type() -> String {
    "unknown".to_string()
}

/// Source of session attachments.
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    async fn session_attachments(&self, session_id: &str) -> Result<Vec<Attachment>, AttachmentError>;
}

/// Attachment service reached over HTTP: `GET {base}/sessions/{id}/attachments`.
pub struct HttpAttachmentSource {
    base_url: String,
    timeout: Option<Duration>,
    client: Client,
}

impl HttpAttachmentSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
            client: Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        self
    }

    pub fn from_config(config: &AttachmentConfig) -> Option<Self> {
        config
            .base_url
            .as_deref()
            .map(|url| Self::new(url).with_timeout(config.timeout()))
    }

    /// The session id always lands in a single, percent-encoded path segment.
    fn endpoint(&self, session_id: &str) -> Result<Url, AttachmentError> {
        if matches!(session_id, "" | "." | "..") {
            return Err(AttachmentError::InvalidSession(session_id.to_string()));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AttachmentError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| AttachmentError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("sessions")
            .push(session_id)
            .push("attachments");
        Ok(url)
    }
}

#[async_trait]
impl AttachmentSource for HttpAttachmentSource {
    async fn session_attachments(&self, session_id: &str) -> Result<Vec<Attachment>, AttachmentError> {
        let response = self.client.get(self.endpoint(session_id)?).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AttachmentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Vec<Attachment>>()
            .await
            .map_err(|e| AttachmentError::Parse(e.to_string()))
    }
}

/// Attachment text gathered for one analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentContext {
    /// Number of attachments in the session
    pub count: usize,
    /// Extracted text, bounded by the collection budget
    pub content: String,
    /// File type of each attachment
    pub types: Vec<String>,
}

impl AttachmentContext {
    /// Concatenates extracted texts, separated by blank lines.
    pub fn collect(attachments: &[Attachment], max_chars: usize) -> Self {
        let mut content = String::new();
        for attachment in attachments {
            let text = attachment.extracted_content.trim();
            if text.is_empty() {
                continue;
            }
            content.push_str(text);
            content.push_str("\n\n");
        }

        Self {
            count: attachments.len(),
            content: truncate_chars(content.trim_end(), max_chars).to_string(),
            types: attachments.iter().map(|a| a.file_type.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Reads a session's attachments, logging and swallowing failures.
    pub async fn load(
        source: &dyn AttachmentSource,
        session_id: &str,
        max_chars: usize,
    ) -> Option<Self> {
        match source.session_attachments(session_id).await {
            Ok(attachments) if attachments.is_empty() => None,
            Ok(attachments) => {
                let context = Self::collect(&attachments, max_chars);
                info!(
                    count = context.count,
                    chars = context.content.chars().count(),
                    "Collected attachment content"
                );
                Some(context).filter(|c| !c.is_empty())
            }
            Err(e) => {
                warn!(session_id, error = %e, "Failed to load attachments");
                None
            }
        }
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
