//! End-to-end analysis pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use super::consolidator::{AnalysisConsolidator, Enrichment, RunInfo};
use super::fallback::{emergency_report, fallback_report};
use super::parser::parse_report;
use super::prompts::{PromptBuilder, PromptInputs, SYSTEM_PROMPT};
use super::report::AnalysisReport;
use super::request::{AnalysisRequest, RequestError};
use crate::attachments::{AttachmentContext, AttachmentSource, HttpAttachmentSource};
use crate::config::{AnalysisConfig, Config};
use crate::llm::{LLMError, Provider, LLM};
use crate::market::{CompetitorAnalyzer, KeywordLookup, MarketSnapshot};
use crate::outcome::Outcome;
use crate::research::{HttpResearchAgent, ResearchAgent, ResearchCollector};

/// Unexpected pipeline failure. The caller receives the emergency report.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Enrichment task failed: {0}")]
    Join(#[from] JoinError),
}

/// Runs one analysis from request to consolidated report.
pub struct AnalysisEngine {
    config: Config,
    llm: Option<Arc<dyn LLM>>,
    research_agent: Option<Arc<dyn ResearchAgent>>,
    attachments: Option<Arc<dyn AttachmentSource>>,
}

impl AnalysisEngine {
    /// An engine with no collaborators; every step uses its local fallback.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            llm: None,
            research_agent: None,
            attachments: None,
        }
    }

    /// Builds every collaborator the configuration enables.
    ///
    /// A collaborator that cannot be built is logged and left out.
    pub fn from_config(config: Config) -> Self {
        let llm = match Provider::from_config(&config.llm).and_then(Provider::build) {
            Ok(llm) => {
                info!(provider = %config.llm.provider, model = %llm.model_name(), "Model client ready");
                Some(Arc::<dyn LLM>::from(llm))
            }
            Err(LLMError::MissingApiKey) => {
                warn!(provider = %config.llm.provider, "No API key configured, running without a model");
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to build model client, running without a model");
                None
            }
        };

        let research_agent = HttpResearchAgent::from_config(&config.research)
            .map(|agent| Arc::new(agent) as Arc<dyn ResearchAgent>);
        if research_agent.is_none() {
            info!("Research agent not configured, using local research");
        }

        let attachments = HttpAttachmentSource::from_config(&config.attachments)
            .map(|source| Arc::new(source) as Arc<dyn AttachmentSource>);

        Self {
            config,
            llm,
            research_agent,
            attachments,
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LLM>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_research_agent(mut self, agent: Arc<dyn ResearchAgent>) -> Self {
        self.research_agent = Some(agent);
        self
    }

    pub fn with_attachment_source(mut self, source: Arc<dyn AttachmentSource>) -> Self {
        self.attachments = Some(source);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub fn has_research_agent(&self) -> bool {
        self.research_agent.is_some()
    }

    pub fn has_attachment_source(&self) -> bool {
        self.attachments.is_some()
    }

    fn analysis_config(&self) -> &AnalysisConfig {
        &self.config.analysis
    }

    /// Produces a report for every request; failures degrade, never propagate.
    #[tracing::instrument(skip(self, request), fields(segment = %request.segment()))]
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport {
        match self.run(request).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Analysis pipeline failed, returning emergency report");
                emergency_report(request.segment(), &e.to_string())
            }
        }
    }

    /// The pipeline proper.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport, EngineError> {
        let started = Instant::now();
        let segment = request.validate()?.to_string();
        info!("Starting market analysis");

        let attachments = self.load_attachments(request).await;

        let research = ResearchCollector::new(self.research_agent.clone(), &self.config.research)
            .collect(request)
            .await;

        let market = MarketSnapshot::build(&segment, request.price);

        let prompt = PromptBuilder::new(self.analysis_config()).build(&PromptInputs {
            request,
            attachments: attachments.as_ref(),
            research: Some(&research.value),
            market: Some(&market),
        });

        let base = self.generate(request, &prompt).await;

        let mut keywords = base.value.keywords.palavras_primarias.clone();
        if keywords.is_empty() {
            keywords.push(format!("{} online", segment));
        }

        let lookup = KeywordLookup::new(
            self.research_agent.clone(),
            self.config.research.keyword_pages,
            self.config.research.max_keywords,
        );
        let analyzer = CompetitorAnalyzer::new(
            self.research_agent.clone(),
            self.config.research.competitor_pages,
            self.config.research.max_competitors,
        );
        let competitors_text = request.competitors().to_string();
        let product = request.product().to_string();
        let competitor_segment = segment.clone();

        let keyword_task = tokio::spawn(async move { lookup.lookup(&keywords).await });
        let competitor_task = tokio::spawn(async move {
            analyzer
                .analyze(&competitor_segment, &competitors_text, &product)
                .await
        });
        let (keywords, competitors) = tokio::try_join!(keyword_task, competitor_task)?;

        let model = match &self.llm {
            Some(llm) => llm.model_name(),
            None => "Fallback".to_string(),
        };

        let report = AnalysisConsolidator::new(self.analysis_config()).consolidate(
            request,
            base,
            Enrichment {
                research,
                keywords,
                competitors,
                market,
                attachments_processed: attachments.is_some(),
            },
            RunInfo {
                model,
                elapsed: started.elapsed(),
            },
        );

        if let Some(metadata) = &report.metadata {
            info!(
                quality = metadata.quality_score,
                degraded = metadata.degraded.len(),
                seconds = metadata.processing_time_seconds,
                "Market analysis finished"
            );
        }

        Ok(report)
    }

    async fn load_attachments(&self, request: &AnalysisRequest) -> Option<AttachmentContext> {
        let source = self.attachments.as_ref()?;
        let session_id = request.session_id.as_deref()?;
        AttachmentContext::load(
            source.as_ref(),
            session_id,
            self.config.attachments.max_collected_chars,
        )
        .await
    }

    /// Asks the model for the report, falling back to the canned one.
    async fn generate(&self, request: &AnalysisRequest, prompt: &str) -> Outcome<AnalysisReport> {
        let fallback = |reason: String| {
            let report = fallback_report(
                request.segment(),
                request.product(),
                request.price,
                &reason,
            );
            Outcome::heuristic(report, reason)
        };

        let Some(llm) = &self.llm else {
            return fallback("model not configured".to_string());
        };

        let timeout = self.config.llm.timeout();
        let reply = match call_with_timeout(llm.as_ref(), prompt, timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Model call failed, using fallback analysis");
                return fallback(e.to_string());
            }
        };

        match parse_report(&reply) {
            Ok(report) => Outcome::live(report),
            Err(e) => {
                warn!(error = %e, chars = reply.len(), "Malformed model response, using fallback analysis");
                fallback(e.to_string())
            }
        }
    }
}

async fn call_with_timeout(
    llm: &dyn LLM,
    prompt: &str,
    timeout: Duration,
) -> Result<String, LLMError> {
    tokio::time::timeout(timeout, llm.complete_with_system(SYSTEM_PROMPT, prompt))
        .await
        .map_err(|_| LLMError::Timeout)?
}
