use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::document::{ResearchQuery, ResearchResult, ResearchSource};
use crate::analysis::lenient;
use crate::config::ResearchConfig;

/// Errors that can occur while talking to the research agent.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Research agent not configured")]
    NotConfigured,

    #[error("Research agent returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ResearchError {
    fn from(err: reqwest::Error) -> Self {
        ResearchError::Network(err.to_string())
    }
}

/// External web-research agent.
///
/// Navigates the web for a query and summarizes what it finds.
#[async_trait]
pub trait ResearchAgent: Send + Sync {
    async fn research(&self, query: &ResearchQuery) -> Result<ResearchResult, ResearchError>;
}

/// Research agent reached over HTTP.
///
/// `POST {base}/research` with the serialized [`ResearchQuery`]; the reply
/// carries a `research_summary` object and a `sources` list.
pub struct HttpResearchAgent {
    base_url: String,
    api_key: Option<String>,
    timeout: Option<Duration>,
    client: Client,
}

impl HttpResearchAgent {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: None,
            client: Client::new(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        self
    }

    /// Builds an agent when research is enabled and an endpoint is set.
    pub fn from_config(config: &ResearchConfig) -> Option<Self> {
        if !config.is_available() {
            return None;
        }
        let base_url = config.base_url.as_deref()?;
        let agent = Self::new(base_url).with_timeout(config.timeout());
        Some(match &config.api_key {
            Some(key) => agent.with_api_key(key.clone()),
            None => agent,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/research", self.base_url)
    }
}

#[async_trait]
impl ResearchAgent for HttpResearchAgent {
    async fn research(&self, query: &ResearchQuery) -> Result<ResearchResult, ResearchError> {
        let mut req = self.client.post(self.endpoint()).json(query);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ResearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: AgentResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::Parse(e.to_string()))?;

        Ok(body.into_result(&query.query))
    }
}

#[derive(Debug, Default, Deserialize)]
struct AgentResponse {
    #[serde(default)]
    research_summary: AgentSummary,
    #[serde(default, deserialize_with = "lenient::list")]
    sources: Vec<ResearchSource>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentSummary {
    #[serde(default, deserialize_with = "lenient::strings")]
    key_insights: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    market_trends: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    opportunities: Vec<String>,
}

impl AgentResponse {
    fn into_result(self, query: &str) -> ResearchResult {
        ResearchResult {
            query: query.to_string(),
            key_insights: self.research_summary.key_insights,
            market_trends: self.research_summary.market_trends,
            opportunities: self.research_summary.opportunities,
            sources: self.sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_config_requires_endpoint() {
        let mut config = ResearchConfig::default();
        assert!(HttpResearchAgent::from_config(&config).is_none());

        config.base_url = Some("http://localhost:9000/".to_string());
        let agent = HttpResearchAgent::from_config(&config).unwrap();
        assert_eq!(agent.endpoint(), "http://localhost:9000/research");

        config.enabled = false;
        assert!(HttpResearchAgent::from_config(&config).is_none());
    }

    #[test]
    fn test_from_config_applies_timeout() {
        let config = ResearchConfig {
            base_url: Some("http://localhost:9000".to_string()),
            timeout_secs: 7,
            ..ResearchConfig::default()
        };
        let agent = HttpResearchAgent::from_config(&config).unwrap();
        assert_eq!(agent.timeout, Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_agent_response_mapping() {
        let body: AgentResponse = serde_json::from_value(json!({
            "research_summary": {
                "key_insights": ["Mercado cresce 20%"],
                "market_trends": "Telemedicina"
            },
            "sources": [{"url": "https://example.com"}]
        }))
        .unwrap();

        let result = body.into_result("mercado saúde");
        assert_eq!(result.query, "mercado saúde");
        assert_eq!(result.key_insights, vec!["Mercado cresce 20%"]);
        assert_eq!(result.market_trends, vec!["Telemedicina"]);
        assert!(result.opportunities.is_empty());
        assert_eq!(result.sources.len(), 1);
    }

    #[test]
    fn test_query_wire_format() {
        let query = ResearchQuery::new("q", 3).with_context("segmento", "fitness");
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["max_pages"], 3);
        assert_eq!(json["context"]["segmento"], "fitness");
    }
}
