use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vantage_core::config::ResearchConfig;
use vantage_core::research::{
    HttpResearchAgent, ResearchAgent, ResearchCollector, ResearchError, ResearchQuery,
    ResearchResult,
};
use vantage_core::AnalysisRequest;

/// Answers every query, remembering what it was asked.
#[derive(Default)]
struct EchoAgent {
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl ResearchAgent for EchoAgent {
    async fn research(&self, query: &ResearchQuery) -> Result<ResearchResult, ResearchError> {
        self.queries.lock().unwrap().push(query.query.clone());
        let mut result = ResearchResult::new(&query.query);
        result.key_insights = vec![format!("insight sobre {}", query.query)];
        Ok(result)
    }
}

struct DownAgent;

#[async_trait]
impl ResearchAgent for DownAgent {
    async fn research(&self, _query: &ResearchQuery) -> Result<ResearchResult, ResearchError> {
        Err(ResearchError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        })
    }
}

fn request() -> AnalysisRequest {
    let mut request = AnalysisRequest::new("educação");
    request.product = Some("Curso de inglês".to_string());
    request
}

#[test]
fn test_queries_capped_and_unique() {
    let collector = ResearchCollector::new(None, &ResearchConfig::default());
    let queries = collector.queries(&request());

    assert_eq!(queries.len(), 8);
    assert_eq!(queries[0], "análise de mercado educação");

    let mut unique = queries.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), queries.len());
}

#[test]
fn test_user_query_leads() {
    let mut request = request();
    request.query = Some("escolas de idiomas online".to_string());

    let collector = ResearchCollector::new(None, &ResearchConfig::default());
    assert_eq!(collector.queries(&request)[0], "escolas de idiomas online");
}

#[tokio::test]
async fn test_collect_runs_every_query_in_order() {
    let agent = Arc::new(EchoAgent::default());
    let collector = ResearchCollector::new(Some(agent.clone()), &ResearchConfig::default());

    let outcome = collector.collect(&request()).await;
    assert!(!outcome.is_degraded());
    assert_eq!(outcome.value.len(), 8);

    let asked = agent.queries.lock().unwrap().clone();
    assert_eq!(asked, collector.queries(&request()));
}

#[tokio::test]
async fn test_collect_degrades_when_agent_down() {
    let collector = ResearchCollector::new(Some(Arc::new(DownAgent)), &ResearchConfig::default());
    let outcome = collector.collect(&request()).await;

    assert!(outcome.is_degraded());
    assert!(outcome.value.is_empty());
}

#[tokio::test]
async fn test_collect_without_agent_is_local() {
    let collector = ResearchCollector::new(None, &ResearchConfig::default());
    let outcome = collector.collect(&request()).await;

    assert!(outcome.is_degraded());
    assert_eq!(outcome.value.len(), 1);
    assert!(outcome.value.get("análise de mercado educação").is_some());
}

#[test]
fn test_http_agent_needs_endpoint() {
    let mut config = ResearchConfig::default();
    assert!(HttpResearchAgent::from_config(&config).is_none());

    config.base_url = Some("http://localhost:8088".to_string());
    assert!(HttpResearchAgent::from_config(&config).is_some());

    config.enabled = false;
    assert!(HttpResearchAgent::from_config(&config).is_none());
}
