use std::sync::Arc;

use tracing::{debug, info, warn};

use super::agent::ResearchAgent;
use super::document::{ResearchDigest, ResearchQuery, ResearchResult};
use crate::analysis::AnalysisRequest;
use crate::config::ResearchConfig;
use crate::outcome::Outcome;

/// Issues the market research queries for one analysis.
#[derive(Clone)]
pub struct ResearchCollector {
    agent: Option<Arc<dyn ResearchAgent>>,
    config: ResearchConfig,
}

impl ResearchCollector {
    pub fn new(agent: Option<Arc<dyn ResearchAgent>>, config: &ResearchConfig) -> Self {
        Self {
            agent,
            config: config.clone(),
        }
    }

    /// The primary query: the user's own, or a generic market query.
    pub fn primary_query(request: &AnalysisRequest) -> String {
        request
            .query
            .clone()
            .unwrap_or_else(|| format!("análise de mercado {}", request.segment()))
    }

    /// Builds the ordered, deduplicated query list.
    ///
    /// Product queries are appended after the segment templates, so they
    /// only survive when the cap leaves room.
    pub fn queries(&self, request: &AnalysisRequest) -> Vec<String> {
        let segment = request.segment();
        let mut candidates = vec![
            Self::primary_query(request),
            format!("mercado {} Brasil 2024 tendências", segment),
            format!("oportunidades negócio {} brasileiro", segment),
            format!("concorrência {} análise competitiva", segment),
            format!("público-alvo {} comportamento consumidor", segment),
            format!("estratégias marketing {} digital", segment),
            format!("preços {} ticket médio Brasil", segment),
            format!("crescimento {} projeções futuro", segment),
        ];

        if let Some(product) = request.product.as_deref() {
            candidates.extend([
                format!("{} mercado brasileiro análise", product),
                format!("como vender {} online Brasil", product),
                format!("{} concorrentes principais", product),
            ]);
        }

        let mut queries: Vec<String> = Vec::new();
        for candidate in candidates {
            if !queries.contains(&candidate) {
                queries.push(candidate);
            }
        }
        queries.truncate(self.config.max_queries);
        queries
    }

    /// Runs every query in order and gathers what comes back.
    ///
    /// Queries run one after another. A failed query is logged and skipped.
    /// Without an agent a single local result stands in for the primary query.
    pub async fn collect(&self, request: &AnalysisRequest) -> Outcome<ResearchDigest> {
        let Some(agent) = &self.agent else {
            debug!("No research agent configured, using local research");
            return Outcome::heuristic(
                fallback_digest(request),
                "research agent not configured",
            );
        };

        let queries = self.queries(request);
        info!(count = queries.len(), "Running market research");

        let mut digest = ResearchDigest::new();
        let mut failures = 0usize;

        for query in &queries {
            let research_query = ResearchQuery::new(query.clone(), self.config.max_pages)
                .with_depth(self.config.depth)
                .with_context("segmento", request.segment())
                .with_context("produto", request.product())
                .with_context("publico", request.audience.as_deref().unwrap_or_default());

            match agent.research(&research_query).await {
                Ok(result) => digest.insert(result),
                Err(e) => {
                    failures += 1;
                    warn!(query = %query, error = %e, "Research query failed");
                }
            }
        }

        info!(
            queries = queries.len(),
            failures,
            insights = digest.key_insights().count(),
            "Market research finished"
        );

        if failures == queries.len() {
            Outcome::heuristic(digest, "every research query failed")
        } else {
            Outcome::live(digest)
        }
    }
}

/// Minimal research used when no agent is available.
pub fn fallback_digest(request: &AnalysisRequest) -> ResearchDigest {
    let segment = request.segment();
    let mut result = ResearchResult::new(ResearchCollector::primary_query(request));

    result.key_insights = vec![
        format!("Mercado de {} apresenta demanda crescente por soluções digitais", segment),
        format!("Consumidores de {} valorizam especialização e prova social", segment),
    ];
    result.market_trends = vec![
        "Digitalização acelerada".to_string(),
        "Personalização em escala".to_string(),
    ];
    result.opportunities = vec![format!("Nichos pouco explorados dentro de {}", segment)];

    if let Some(product) = request.product.as_deref() {
        result
            .opportunities
            .push(format!("Posicionar {} com proposta de valor clara", product));
    }

    let mut digest = ResearchDigest::new();
    digest.insert(result);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::ResearchError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingAgent {
        seen: Mutex<Vec<ResearchQuery>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl ResearchAgent for RecordingAgent {
        async fn research(&self, query: &ResearchQuery) -> Result<ResearchResult, ResearchError> {
            self.seen.lock().unwrap().push(query.clone());
            if self.fail_on.as_deref() == Some(query.query.as_str()) {
                return Err(ResearchError::Network("connection refused".to_string()));
            }
            let mut result = ResearchResult::new(query.query.clone());
            result.key_insights.push(format!("insight sobre {}", query.query));
            Ok(result)
        }
    }

    fn request(segment: &str, product: Option<&str>) -> AnalysisRequest {
        AnalysisRequest {
            product: product.map(str::to_string),
            ..AnalysisRequest::new(segment)
        }
    }

    #[test]
    fn test_queries_capped_and_ordered() {
        let collector = ResearchCollector::new(None, &ResearchConfig::default());
        let queries = collector.queries(&request("fitness", Some("app de treino")));

        assert_eq!(queries.len(), 8);
        assert_eq!(queries[0], "análise de mercado fitness");
        assert_eq!(queries[1], "mercado fitness Brasil 2024 tendências");
        assert!(!queries.iter().any(|q| q.contains("app de treino")));
    }

    #[test]
    fn test_queries_deduplicated() {
        let mut config = ResearchConfig::default();
        config.max_queries = 20;
        let collector = ResearchCollector::new(None, &config);

        let mut req = request("fitness", None);
        req.query = Some("mercado fitness Brasil 2024 tendências".to_string());

        let queries = collector.queries(&req);
        assert_eq!(queries.len(), 7);
        assert_eq!(queries[0], "mercado fitness Brasil 2024 tendências");
    }

    #[tokio::test]
    async fn test_collect_without_agent_is_heuristic() {
        let collector = ResearchCollector::new(None, &ResearchConfig::default());
        let outcome = collector.collect(&request("saúde", None)).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.value.len(), 1);
        assert!(outcome.value.get("análise de mercado saúde").is_some());
    }

    #[tokio::test]
    async fn test_failed_query_contributes_nothing() {
        let agent = Arc::new(RecordingAgent {
            seen: Mutex::new(Vec::new()),
            fail_on: Some("análise de mercado saúde".to_string()),
        });
        let collector = ResearchCollector::new(Some(agent.clone()), &ResearchConfig::default());

        let outcome = collector.collect(&request("saúde", None)).await;

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value.len(), 7);
        assert!(outcome.value.get("análise de mercado saúde").is_none());

        let seen = agent.seen.lock().unwrap();
        assert_eq!(seen.len(), 8);
        assert_eq!(seen[0].max_pages, 7);
        assert_eq!(seen[0].depth, 2);
        assert_eq!(seen[0].context.get("segmento").map(String::as_str), Some("saúde"));
    }
}
