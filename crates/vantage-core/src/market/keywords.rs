use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::outcome::Outcome;
use crate::research::{ResearchAgent, ResearchQuery};

/// Niches whose clicks are priced higher.
const HIGH_VALUE_NICHES: [&str; 5] = ["finanças", "investimento", "marketing", "saúde", "educação"];

const VOLUME_PER_WORD: u64 = 10_000;
const VOLUME_CAP: u64 = 50_000;
const STABLE_TREND: &str = "Crescimento Estável";

/// Ranking difficulty band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Alta,
    #[serde(rename = "Média")]
    Media,
    Baixa,
}

impl Difficulty {
    /// Longer phrases face less competition.
    pub fn for_word_count(words: usize) -> Self {
        if words > 3 {
            Difficulty::Baixa
        } else if words > 2 {
            Difficulty::Media
        } else {
            Difficulty::Alta
        }
    }
}

/// Search metrics for one keyword.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetrics {
    pub volume: u64,
    pub difficulty: Difficulty,
    pub cpc: f64,
    pub trend: String,
    #[serde(default)]
    pub insights_web: Vec<String>,
    #[serde(default)]
    pub trends_web: Vec<String>,
}

/// Deterministic keyword metrics derived from the keyword text alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSimulator;

impl KeywordSimulator {
    pub fn metrics(keyword: &str) -> KeywordMetrics {
        let words = keyword.split_whitespace().count();
        let lowered = keyword.to_lowercase();

        let cpc = if HIGH_VALUE_NICHES.iter().any(|niche| lowered.contains(niche)) {
            2.50 + 0.50 * words as f64
        } else {
            1.20 + 0.30 * words as f64
        };

        KeywordMetrics {
            volume: (words as u64 * VOLUME_PER_WORD).min(VOLUME_CAP),
            difficulty: Difficulty::for_word_count(words),
            cpc: round_cents(cpc),
            trend: STABLE_TREND.to_string(),
            insights_web: Vec::new(),
            trends_web: Vec::new(),
        }
    }

    pub fn simulate(keywords: &[String]) -> BTreeMap<String, KeywordMetrics> {
        keywords
            .iter()
            .map(|k| (k.clone(), Self::metrics(k)))
            .collect()
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Keyword metrics enriched with live research when an agent is available.
///
/// Only the first `max_researched` keywords are researched.
#[derive(Clone)]
pub struct KeywordLookup {
    agent: Option<Arc<dyn ResearchAgent>>,
    max_pages: u32,
    max_researched: usize,
}

impl KeywordLookup {
    pub fn new(agent: Option<Arc<dyn ResearchAgent>>, max_pages: u32, max_researched: usize) -> Self {
        Self {
            agent,
            max_pages,
            max_researched,
        }
    }

    /// Looks up every keyword; numbers always come from the simulator.
    pub async fn lookup(&self, keywords: &[String]) -> Outcome<BTreeMap<String, KeywordMetrics>> {
        let Some(agent) = &self.agent else {
            debug!("No research agent configured, simulating keyword data");
            return Outcome::heuristic(
                KeywordSimulator::simulate(keywords),
                "research agent not configured",
            );
        };

        let mut data = BTreeMap::new();
        let mut attempted = 0usize;
        let mut failures = 0usize;

        for keyword in keywords {
            let mut metrics = KeywordSimulator::metrics(keyword);
            if attempted >= self.max_researched {
                data.insert(keyword.clone(), metrics);
                continue;
            }
            attempted += 1;

            let query = ResearchQuery::new(
                format!("tendências de mercado para {}", keyword),
                self.max_pages,
            )
            .with_context("keyword", keyword);

            match agent.research(&query).await {
                Ok(result) => {
                    metrics.insights_web = result.key_insights;
                    metrics.trends_web = result.market_trends;
                }
                Err(e) => {
                    failures += 1;
                    warn!(keyword = %keyword, error = %e, "Keyword research failed");
                }
            }

            data.insert(keyword.clone(), metrics);
        }

        if !keywords.is_empty() && failures == attempted {
            Outcome::heuristic(data, "every keyword query failed")
        } else {
            Outcome::live(data)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::{ResearchError, ResearchResult};
    use async_trait::async_trait;

    #[test]
    fn test_single_word() {
        let m = KeywordSimulator::metrics("pilates");
        assert_eq!(m.volume, 10_000);
        assert_eq!(m.difficulty, Difficulty::Alta);
        assert_eq!(m.cpc, 1.5);
        assert_eq!(m.trend, "Crescimento Estável");
        assert!(m.insights_web.is_empty());
    }

    #[test]
    fn test_volume_capped() {
        let m = KeywordSimulator::metrics("um dois três quatro cinco seis sete");
        assert_eq!(m.volume, 50_000);
        assert_eq!(m.difficulty, Difficulty::Baixa);
    }

    #[test]
    fn test_cpc_monotonic_in_word_count() {
        let phrases = ["curso", "curso online", "curso online barato", "curso online barato hoje"];
        let cpcs: Vec<f64> = phrases.iter().map(|p| KeywordSimulator::metrics(p).cpc).collect();
        assert!(cpcs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_high_value_niche_bump() {
        for words in ["Marketing", "consultoria de saúde", "EDUCAÇÃO financeira infantil online"] {
            let n = words.split_whitespace().count();
            let plain = KeywordSimulator::metrics(&vec!["x"; n].join(" "));
            let niche = KeywordSimulator::metrics(words);
            assert!(niche.cpc > plain.cpc, "{} should cost more", words);
        }
        assert_eq!(KeywordSimulator::metrics("marketing digital").cpc, 3.5);
    }

    #[test]
    fn test_difficulty_wire_format() {
        let json = serde_json::to_string(&Difficulty::Media).unwrap();
        assert_eq!(json, "\"Média\"");
    }

    struct FlakyAgent;

    #[async_trait]
    impl ResearchAgent for FlakyAgent {
        async fn research(&self, query: &ResearchQuery) -> Result<ResearchResult, ResearchError> {
            if query.query.contains("falha") {
                return Err(ResearchError::Network("timeout".to_string()));
            }
            let mut result = ResearchResult::new(query.query.clone());
            result.key_insights.push("alta procura".to_string());
            result.market_trends.push("mobile".to_string());
            Ok(result)
        }
    }

    #[tokio::test]
    async fn test_lookup_keeps_simulated_entry_on_failure() {
        let lookup = KeywordLookup::new(Some(Arc::new(FlakyAgent)), 2, 5);
        let keywords = vec!["yoga online".to_string(), "falha".to_string()];

        let outcome = lookup.lookup(&keywords).await;
        assert!(!outcome.is_degraded());

        let data = outcome.into_inner();
        assert_eq!(data["yoga online"].insights_web, vec!["alta procura"]);
        assert_eq!(data["yoga online"].trends_web, vec!["mobile"]);
        assert_eq!(data["falha"], KeywordSimulator::metrics("falha"));
    }

    #[derive(Default)]
    struct CountingAgent(std::sync::atomic::AtomicUsize);

    #[async_trait]
    impl ResearchAgent for CountingAgent {
        async fn research(&self, query: &ResearchQuery) -> Result<ResearchResult, ResearchError> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(ResearchResult::new(query.query.clone()))
        }
    }

    #[tokio::test]
    async fn test_lookup_researches_at_most_the_limit() {
        let agent = Arc::new(CountingAgent::default());
        let lookup = KeywordLookup::new(Some(agent.clone()), 2, 2);
        let keywords: Vec<String> = (0..6).map(|i| format!("palavra {}", i)).collect();

        let outcome = lookup.lookup(&keywords).await;
        assert_eq!(agent.0.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value.len(), 6);
        assert_eq!(outcome.value["palavra 5"], KeywordSimulator::metrics("palavra 5"));
    }

    #[tokio::test]
    async fn test_lookup_without_agent() {
        let lookup = KeywordLookup::new(None, 2, 5);
        let outcome = lookup.lookup(&["yoga".to_string()]).await;
        assert!(outcome.is_degraded());
        assert_eq!(outcome.value.len(), 1);
    }
}
