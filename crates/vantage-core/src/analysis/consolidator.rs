//! Merges the model report with research, keyword and competitor data.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::report::{AnalysisReport, DegradedStep, ReportMetadata};
use super::request::AnalysisRequest;
use crate::config::AnalysisConfig;
use crate::market::{CompetitorProfile, KeywordMetrics, MarketSnapshot};
use crate::outcome::Outcome;
use crate::research::ResearchDigest;

const INSUFFICIENT_BUDGET: &str = "Orçamento insuficiente";
const MISSING_GOAL: &str = "Meta de receita não informada";
const RICH_NOTES_CHARS: usize = 100;
const POINTS_PER_SECTION: u32 = 15;
const DEPTH_BONUS: u32 = 10;
const DEPTH_BONUS_INSIGHTS: usize = 5;

/// Marketing budget versus price, written under `viabilidade_orcamentaria`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetViability {
    pub cac_maximo_recomendado: f64,
    pub leads_possiveis_orcamento: u64,
    pub conversao_necessaria: String,
}

/// Sales targets derived from price, revenue goal and budget.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinancialProjection {
    pub required_sales: Option<u64>,
    pub monthly_sales: Option<u64>,
    pub budget: Option<BudgetViability>,
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

impl FinancialProjection {
    /// Every quotient is only computed when its divisor is a positive number.
    pub fn derive(
        price: Option<f64>,
        goal: Option<f64>,
        budget: Option<f64>,
        config: &AnalysisConfig,
    ) -> Self {
        let price = positive(price);
        let goal = positive(goal);

        let sales = match (goal, price) {
            (Some(goal), Some(price)) => Some(goal / price),
            _ => None,
        };
        let monthly = sales.map(|s| s / 12.0);

        let budget = match (positive(budget), price) {
            (Some(budget), Some(price)) => {
                let leads = positive(Some(config.cost_per_lead))
                    .map(|cpl| budget / cpl)
                    .unwrap_or(0.0);

                let conversion = if leads < 1.0 {
                    INSUFFICIENT_BUDGET.to_string()
                } else {
                    match monthly.filter(|m| *m > 0.0) {
                        Some(monthly) => format!("{:.1}%", 100.0 / (leads / monthly)),
                        None => MISSING_GOAL.to_string(),
                    }
                };

                Some(BudgetViability {
                    cac_maximo_recomendado: round_cents(price * config.max_cac_ratio),
                    leads_possiveis_orcamento: leads.floor() as u64,
                    conversao_necessaria: conversion,
                })
            }
            _ => None,
        };

        Self {
            required_sales: sales.map(|s| s.floor() as u64),
            monthly_sales: monthly.map(|m| m.floor() as u64),
            budget,
        }
    }

    /// Writes the targets into the report, leaving absent values untouched.
    pub fn apply(&self, report: &mut AnalysisReport) {
        if let Some(sales) = self.required_sales {
            report.metrics.vendas_necessarias_meta = Some(sales);
        }
        if let Some(monthly) = self.monthly_sales {
            report.metrics.vendas_mensais_meta = Some(monthly);
        }
        if let Some(budget) = &self.budget {
            report.budget = Some(budget.clone());
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 15 points per populated core section, 10 more for deep insight lists, at most 100.
pub fn quality_score(report: &AnalysisReport) -> u32 {
    let mut score = report.populated_sections() as u32 * POINTS_PER_SECTION;
    if report.insights.len() >= DEPTH_BONUS_INSIGHTS {
        score += DEPTH_BONUS;
    }
    score.min(100)
}

/// Enrichment gathered around the model call.
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub research: Outcome<ResearchDigest>,
    pub keywords: Outcome<BTreeMap<String, KeywordMetrics>>,
    pub competitors: Outcome<Vec<CompetitorProfile>>,
    pub market: MarketSnapshot,
    pub attachments_processed: bool,
}

/// Identity of the run, recorded in the report metadata.
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub model: String,
    pub elapsed: Duration,
}

/// Builds the final report. Pure: no I/O.
pub struct AnalysisConsolidator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> AnalysisConsolidator<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn consolidate(
        &self,
        request: &AnalysisRequest,
        base: Outcome<AnalysisReport>,
        enrichment: Enrichment,
        run: RunInfo,
    ) -> AnalysisReport {
        let mut degraded = Vec::new();
        record(&mut degraded, "analysis", base.reason());
        record(&mut degraded, "research", enrichment.research.reason());
        record(&mut degraded, "keywords", enrichment.keywords.reason());
        record(&mut degraded, "competitors", enrichment.competitors.reason());

        let model_live = !base.is_degraded();
        let research_live = !enrichment.research.is_degraded() && !enrichment.research.value.is_empty();

        let mut report = base.into_inner();
        let prior = report.metadata.take();

        if research_live {
            let web: Vec<String> = enrichment
                .research
                .value
                .key_insights()
                .take(self.config.max_web_insights)
                .map(|insight| format!("Web Research: {}", insight))
                .collect();
            report.insights.extend(web);
        }

        let keywords = enrichment.keywords.into_inner();
        if !keywords.is_empty() {
            report.keywords.dados_reais = keywords;
        }
        report.competitors = enrichment.competitors.into_inner();
        report.market_snapshot = Some(enrichment.market);

        FinancialProjection::derive(
            request.price,
            request.revenue_goal,
            request.marketing_budget,
            self.config,
        )
        .apply(&mut report);

        let mut data_sources = Vec::new();
        if model_live {
            data_sources.push(run.model.clone());
        }
        if research_live {
            data_sources.push("Pesquisa web".to_string());
            data_sources.extend(enrichment.research.value.source_urls());
        }
        if enrichment.attachments_processed {
            data_sources.push("Anexos da sessão".to_string());
        }
        data_sources.push("Heurísticas locais".to_string());

        let ai_model = if model_live {
            run.model
        } else {
            prior
                .as_ref()
                .map(|m| m.ai_model.clone())
                .unwrap_or_else(|| "Fallback".to_string())
        };

        report.metadata = Some(ReportMetadata {
            processing_time_seconds: run.elapsed.as_secs_f64(),
            ai_model,
            generated_at: Utc::now(),
            quality_score: quality_score(&report),
            data_sources,
            websailor_used: research_live,
            attachments_processed: enrichment.attachments_processed,
            qualidade_dados: if request.notes_len() > RICH_NOTES_CHARS {
                "Alta".to_string()
            } else {
                "Média".to_string()
            },
            confiabilidade: if report.insights.is_empty() {
                "85%".to_string()
            } else {
                "95%".to_string()
            },
            degraded,
            note: prior.as_ref().and_then(|m| m.note.clone()),
            error: prior.and_then(|m| m.error),
        });

        report
    }
}

fn record(degraded: &mut Vec<DegradedStep>, step: &str, reason: Option<&str>) {
    if let Some(reason) = reason {
        degraded.push(DegradedStep {
            step: step.to_string(),
            reason: reason.to_string(),
        });
    }
}
