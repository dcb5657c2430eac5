//! Market analysis: request, prompt, model reply, consolidation.

mod consolidator;
mod engine;
mod fallback;
pub(crate) mod lenient;
mod parser;
mod prompts;
mod report;
mod request;

pub use consolidator::{
    quality_score, AnalysisConsolidator, BudgetViability, Enrichment, FinancialProjection, RunInfo,
};
pub use engine::{AnalysisEngine, EngineError};
pub use fallback::{emergency_report, fallback_report};
pub use parser::{extract_json_payload, parse_report, MalformedResponse};
pub use prompts::{PromptBuilder, PromptInputs, ANALYSIS_SCHEMA, SYSTEM_PROMPT};
pub use report::{
    ActionPhase, ActionPlan, AnalysisReport, Avatar, DegradedStep, Demographics,
    FinancialScenarios, FunnelStage, KeywordStrategy, LanguageMap, MarketIntelligence,
    PerformanceMetrics, Psychographics, ReportMetadata, SalesFunnel, Scenario, Scope,
};
pub use request::{format_amount, parse_amount, AnalysisRequest, RequestError};
