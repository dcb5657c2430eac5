use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::lenient;

/// A single request to the research agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchQuery {
    /// Free-text topic to research
    pub query: String,
    /// Background the agent may use to focus the search
    pub context: BTreeMap<String, String>,
    /// Upper bound on pages visited
    pub max_pages: u32,
    /// Link depth followed from each result
    pub depth: u32,
}

impl ResearchQuery {
    pub fn new(query: impl Into<String>, max_pages: u32) -> Self {
        Self {
            query: query.into(),
            context: BTreeMap::new(),
            max_pages,
            depth: 1,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Adds a context entry, skipping empty values.
    pub fn with_context(mut self, key: impl Into<String>, value: &str) -> Self {
        if !value.trim().is_empty() {
            self.context.insert(key.into(), value.trim().to_string());
        }
        self
    }
}

/// Findings returned for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    /// The query that produced this result
    pub query: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub key_insights: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub market_trends: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub opportunities: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub sources: Vec<ResearchSource>,
}

impl ResearchResult {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// True when the agent returned nothing usable.
    pub fn is_empty(&self) -> bool {
        self.key_insights.is_empty() && self.market_trends.is_empty() && self.opportunities.is_empty()
    }
}

/// A page the agent consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResearchSource {
    Page {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Url(String),
}

impl ResearchSource {
    pub fn url(&self) -> &str {
        match self {
            ResearchSource::Page { url, .. } => url,
            ResearchSource::Url(url) => url,
        }
    }
}

/// Research results for one analysis, in query order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchDigest {
    pub results: Vec<ResearchResult>,
}

impl ResearchDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a result, replacing any earlier result for the same query.
    pub fn insert(&mut self, result: ResearchResult) {
        match self.results.iter_mut().find(|r| r.query == result.query) {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }

    pub fn get(&self, query: &str) -> Option<&ResearchResult> {
        self.results.iter().find(|r| r.query == query)
    }

    pub fn is_empty(&self) -> bool {
        self.results.iter().all(ResearchResult::is_empty)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Every insight across all queries, in query order.
    pub fn key_insights(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .flat_map(|r| r.key_insights.iter().map(String::as_str))
    }

    /// Distinct source URLs across all queries.
    pub fn source_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for source in self.results.iter().flat_map(|r| &r.sources) {
            if !urls.iter().any(|u| u == source.url()) {
                urls.push(source.url().to_string());
            }
        }
        urls
    }
}
