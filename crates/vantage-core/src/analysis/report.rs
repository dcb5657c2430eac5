//! Typed shape of the consolidated analysis report.
//!
//! Serialized field names are the Portuguese keys the model is asked to
//! fill and that API consumers read. Every section keeps a flattened
//! `extra` map for fields the model adds beyond the requested schema.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::consolidator::BudgetViability;
use super::lenient;
use crate::market::{CompetitorProfile, KeywordMetrics, MarketSnapshot};

type Extra = Map<String, Value>;

/// The full report returned to the caller and persisted on completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(rename = "avatar_ultra_detalhado", default, deserialize_with = "lenient::section")]
    pub avatar: Avatar,

    #[serde(rename = "escopo", default, deserialize_with = "lenient::section")]
    pub scope: Scope,

    #[serde(rename = "analise_concorrencia_detalhada", default, deserialize_with = "lenient::list")]
    pub competitors: Vec<CompetitorProfile>,

    #[serde(rename = "estrategia_palavras_chave", default, deserialize_with = "lenient::section")]
    pub keywords: KeywordStrategy,

    #[serde(rename = "metricas_performance_detalhadas", default, deserialize_with = "lenient::section")]
    pub metrics: PerformanceMetrics,

    #[serde(rename = "funil_vendas_otimizado", default, deserialize_with = "lenient::section")]
    pub funnel: SalesFunnel,

    #[serde(rename = "inteligencia_mercado", default, deserialize_with = "lenient::section")]
    pub intelligence: MarketIntelligence,

    #[serde(rename = "plano_acao_detalhado", default, deserialize_with = "lenient::section")]
    pub action_plan: ActionPlan,

    #[serde(rename = "insights_exclusivos", default, deserialize_with = "lenient::strings")]
    pub insights: Vec<String>,

    #[serde(
        rename = "viabilidade_orcamentaria",
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub budget: Option<BudgetViability>,

    #[serde(
        rename = "panorama_heuristico",
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub market_snapshot: Option<MarketSnapshot>,

    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReportMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl AnalysisReport {
    /// Number of core sections carrying content, out of [`Self::SCORED_SECTIONS`].
    pub fn populated_sections(&self) -> usize {
        [
            !self.avatar.is_empty(),
            !self.scope.is_empty(),
            !self.competitors.is_empty(),
            !self.metrics.is_empty(),
            !self.action_plan.is_empty(),
            !self.insights.is_empty(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }

    pub const SCORED_SECTIONS: usize = 6;
}

/// Synthesized ideal-customer profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub nome_ficticio: String,

    #[serde(default, deserialize_with = "lenient::section")]
    pub perfil_demografico: Demographics,

    #[serde(default, deserialize_with = "lenient::section", skip_serializing_if = "Psychographics::is_empty")]
    pub perfil_psicografico: Psychographics,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub resumo_jornada_dor: String,

    #[serde(default, deserialize_with = "lenient::strings")]
    pub dores_especificas: Vec<String>,

    #[serde(default, deserialize_with = "lenient::strings")]
    pub desejos_profundos: Vec<String>,

    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    pub medos_paralisantes: Vec<String>,

    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    pub frustracoes_diarias: Vec<String>,

    #[serde(default, deserialize_with = "lenient::section", skip_serializing_if = "LanguageMap::is_empty")]
    pub linguagem_interna_externa: LanguageMap,

    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    pub objecoes_reais: Vec<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub dia_perfeito: String,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub pior_pesadelo: String,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Avatar {
    pub fn is_empty(&self) -> bool {
        self.nome_ficticio.is_empty()
            && self.perfil_demografico.is_empty()
            && self.perfil_psicografico.is_empty()
            && self.resumo_jornada_dor.is_empty()
            && self.dores_especificas.is_empty()
            && self.desejos_profundos.is_empty()
            && self.medos_paralisantes.is_empty()
            && self.frustracoes_diarias.is_empty()
            && self.linguagem_interna_externa.is_empty()
            && self.objecoes_reais.is_empty()
            && self.dia_perfeito.is_empty()
            && self.pior_pesadelo.is_empty()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub idade: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub genero: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub renda: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub escolaridade: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub localizacao: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub estado_civil: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub ocupacao: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Demographics {
    pub fn is_empty(&self) -> bool {
        [
            &self.idade,
            &self.genero,
            &self.renda,
            &self.escolaridade,
            &self.localizacao,
            &self.estado_civil,
            &self.ocupacao,
        ]
        .iter()
        .all(|field| field.is_empty())
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Psychographics {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub personalidade: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub valores: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub interesses: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub estilo_vida: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub comportamento_compra: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub influenciadores: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Psychographics {
    pub fn is_empty(&self) -> bool {
        [
            &self.personalidade,
            &self.valores,
            &self.interesses,
            &self.estilo_vida,
            &self.comportamento_compra,
            &self.influenciadores,
        ]
        .iter()
        .all(|field| field.is_empty())
            && self.extra.is_empty()
    }
}

/// Words and sources the audience actually uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageMap {
    #[serde(default, deserialize_with = "lenient::strings")]
    pub frases_dores: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub frases_desejos: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub metaforas_comuns: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub fontes_confianca: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl LanguageMap {
    pub fn is_empty(&self) -> bool {
        self.frases_dores.is_empty()
            && self.frases_desejos.is_empty()
            && self.metaforas_comuns.is_empty()
            && self.fontes_confianca.is_empty()
            && self.extra.is_empty()
    }
}

/// Market positioning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default, deserialize_with = "lenient::text")]
    pub posicionamento_mercado: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub proposta_valor: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub diferenciais_competitivos: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Scope {
    pub fn is_empty(&self) -> bool {
        self.posicionamento_mercado.is_empty()
            && self.proposta_valor.is_empty()
            && self.diferenciais_competitivos.is_empty()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordStrategy {
    #[serde(default, deserialize_with = "lenient::strings")]
    pub palavras_primarias: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub palavras_secundarias: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub palavras_cauda_longa: Vec<String>,
    /// Per-keyword metrics filled in locally after the model reply.
    #[serde(default, deserialize_with = "lenient::section")]
    pub dados_reais: BTreeMap<String, KeywordMetrics>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(default, deserialize_with = "lenient::strings")]
    pub kpis_essenciais: Vec<String>,

    #[serde(default, deserialize_with = "lenient::section")]
    pub projecoes_financeiras: FinancialScenarios,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub tempo_retorno_investimento: String,

    /// Sales needed to hit the revenue goal.
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub vendas_necessarias_meta: Option<u64>,

    /// Monthly share of [`Self::vendas_necessarias_meta`].
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub vendas_mensais_meta: Option<u64>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl PerformanceMetrics {
    pub fn is_empty(&self) -> bool {
        self.kpis_essenciais.is_empty()
            && self.projecoes_financeiras.is_empty()
            && self.tempo_retorno_investimento.is_empty()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialScenarios {
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub cenario_conservador: Option<Scenario>,
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub cenario_realista: Option<Scenario>,
    #[serde(default, deserialize_with = "lenient::optional", skip_serializing_if = "Option::is_none")]
    pub cenario_otimista: Option<Scenario>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl FinancialScenarios {
    pub fn is_empty(&self) -> bool {
        self.cenario_conservador.is_none()
            && self.cenario_realista.is_none()
            && self.cenario_otimista.is_none()
            && self.extra.is_empty()
    }
}

/// One projected month under a given scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub vendas_mensais: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub receita_mensal: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub lucro_mensal: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub roi_estimado: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesFunnel {
    #[serde(default, deserialize_with = "lenient::list")]
    pub etapas: Vec<FunnelStage>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    #[serde(default, deserialize_with = "lenient::text")]
    pub nome: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub atividades: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub metricas: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketIntelligence {
    #[serde(default, deserialize_with = "lenient::strings")]
    pub tendencias_atuais: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub oportunidades_identificadas: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub ameacas_desafios: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub recomendacoes_estrategicas: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    #[serde(default, deserialize_with = "lenient::list")]
    pub fases: Vec<ActionPhase>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ActionPlan {
    pub fn is_empty(&self) -> bool {
        self.fases.is_empty() && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPhase {
    #[serde(default, deserialize_with = "lenient::text")]
    pub nome: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "String::is_empty")]
    pub objetivo: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub atividades: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings", skip_serializing_if = "Vec::is_empty")]
    pub kpis_fase: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A pipeline step that fell back to local heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedStep {
    pub step: String,
    pub reason: String,
}

/// How the report was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub processing_time_seconds: f64,
    pub ai_model: String,
    pub generated_at: DateTime<Utc>,
    pub quality_score: u32,
    #[serde(default)]
    pub data_sources: Vec<String>,
    #[serde(default)]
    pub websailor_used: bool,
    #[serde(default)]
    pub attachments_processed: bool,
    #[serde(default)]
    pub qualidade_dados: String,
    #[serde(default)]
    pub confiabilidade: String,
    #[serde(default)]
    pub degraded: Vec<DegradedStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportMetadata {
    /// True when any step fell back to heuristics.
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mismatched_section_defaults() {
        let report: AnalysisReport = serde_json::from_value(json!({
            "avatar_ultra_detalhado": "texto solto",
            "escopo": {"proposta_valor": "Valor", "nicho_especifico": "Mães"},
            "insights_exclusivos": ["a", "b"]
        }))
        .unwrap();

        assert!(report.avatar.is_empty());
        assert_eq!(report.scope.proposta_valor, "Valor");
        assert_eq!(report.scope.extra["nicho_especifico"], "Mães");
        assert_eq!(report.insights.len(), 2);
    }

    #[test]
    fn test_unknown_top_level_keys_kept() {
        let report: AnalysisReport = serde_json::from_value(json!({
            "projecoes_cenarios": {"realista": {"receita_mensal": "R$ 10.000"}},
            "insights_exclusivos": []
        }))
        .unwrap();

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["projecoes_cenarios"]["realista"]["receita_mensal"], "R$ 10.000");
    }

    #[test]
    fn test_competitor_object_instead_of_list() {
        let report: AnalysisReport = serde_json::from_value(json!({
            "analise_concorrencia_detalhada": {"concorrentes_diretos": []}
        }))
        .unwrap();
        assert!(report.competitors.is_empty());
    }

    #[test]
    fn test_populated_sections() {
        let mut report = AnalysisReport::default();
        assert_eq!(report.populated_sections(), 0);

        report.insights.push("x".to_string());
        report.scope.proposta_valor = "y".to_string();
        assert_eq!(report.populated_sections(), 2);
    }

    #[test]
    fn test_demographics_numbers_become_text() {
        let avatar: Avatar = serde_json::from_value(json!({
            "perfil_demografico": {"idade": 35, "renda": "R$ 5.000"},
            "dores_especificas": "Falta de tempo"
        }))
        .unwrap();
        assert_eq!(avatar.perfil_demografico.idade, "35");
        assert_eq!(avatar.dores_especificas, vec!["Falta de tempo"]);
        assert!(!avatar.is_empty());
    }
}
