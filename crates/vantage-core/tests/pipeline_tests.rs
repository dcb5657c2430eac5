use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use vantage_core::analysis::{
    extract_json_payload, parse_report, AnalysisEngine, MalformedResponse, PromptBuilder,
    PromptInputs, ANALYSIS_SCHEMA,
};
use vantage_core::attachments::{Attachment, AttachmentError, AttachmentSource};
use vantage_core::llm::{LLMError, LLM};
use vantage_core::research::{ResearchAgent, ResearchError, ResearchQuery, ResearchResult};
use vantage_core::{AnalysisRequest, Config};

/// Replies with a fixed text and keeps the last prompt.
struct ScriptedLLM {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLLM {
    fn new(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LLM for ScriptedLLM {
    async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    async fn complete_with_system(&self, _system: &str, prompt: &str) -> Result<String, LLMError> {
        self.complete(prompt).await
    }

    fn model_name(&self) -> String {
        "scripted".to_string()
    }
}

struct FailingLLM;

#[async_trait]
impl LLM for FailingLLM {
    async fn complete(&self, _prompt: &str) -> Result<String, LLMError> {
        Err(LLMError::RateLimited)
    }

    async fn complete_with_system(&self, _system: &str, _prompt: &str) -> Result<String, LLMError> {
        Err(LLMError::RateLimited)
    }

    fn model_name(&self) -> String {
        "failing".to_string()
    }
}

/// Returns insights that hit every competitor classifier.
struct MarketAgent;

#[async_trait]
impl ResearchAgent for MarketAgent {
    async fn research(&self, query: &ResearchQuery) -> Result<ResearchResult, ResearchError> {
        let mut result = ResearchResult::new(&query.query);
        result.key_insights = vec![
            "Marca forte entre iniciantes".to_string(),
            "Desafio de retenção após 3 meses".to_string(),
            "Campanha agressiva no Instagram".to_string(),
        ];
        result.market_trends = vec!["Treinos híbridos".to_string()];
        Ok(result)
    }
}

struct SessionFiles;

#[async_trait]
impl AttachmentSource for SessionFiles {
    async fn session_attachments(&self, session_id: &str) -> Result<Vec<Attachment>, AttachmentError> {
        Ok(vec![Attachment {
            session_id: session_id.to_string(),
            extracted_content: "Pesquisa interna: 62% dos alunos treinam à noite.".to_string(),
            file_type: "pdf".to_string(),
        }])
    }
}

fn model_reply() -> String {
    let body = json!({
        "avatar_ultra_detalhado": {
            "nome_ficticio": "Rafael Corredor",
            "perfil_demografico": {"idade": "25-34 anos"},
            "dores_especificas": ["Falta de constância"]
        },
        "escopo": {"posicionamento_mercado": "Treino funcional para quem tem pouco tempo"},
        "estrategia_palavras_chave": {"palavras_primarias": ["treino funcional", "academia em casa"]},
        "metricas_performance_detalhadas": {"kpis_essenciais": ["CAC", "LTV"]},
        "plano_acao_detalhado": {"fases": [{"nome": "Fase 1", "atividades": ["Pré-venda"]}]},
        "insights_exclusivos": ["a", "b", "c", "d", "e"]
    });
    format!("Claro! Segue a análise:\n```json\n{}\n```\nBoa sorte!", body)
}

fn fitness_request() -> AnalysisRequest {
    let mut request = AnalysisRequest::new("fitness");
    request.product = Some("Plano de treino online".to_string());
    request.price = Some(100.0);
    request.revenue_goal = Some(120_000.0);
    request.marketing_budget = Some(10_000.0);
    request.competitors = Some("Smart Fit, Queima Diária".to_string());
    request.session_id = Some("sess-1".to_string());
    request
}

#[test]
fn test_fenced_json_block_extracted() {
    let payload = extract_json_payload(&model_reply()).unwrap();
    assert_eq!(payload["avatar_ultra_detalhado"]["nome_ficticio"], "Rafael Corredor");
    assert_eq!(payload["insights_exclusivos"].as_array().unwrap().len(), 5);
}

#[test]
fn test_reply_without_json_is_malformed() {
    let result = parse_report("O modelo está indisponível no momento.");
    assert_eq!(result.unwrap_err(), MalformedResponse::NoPayload);
}

#[test]
fn test_prompt_carries_schema() {
    let request = fitness_request();
    let prompt = PromptBuilder::new(&Config::default().analysis).build(&PromptInputs::new(&request));
    assert!(prompt.contains(ANALYSIS_SCHEMA));
    assert!(prompt.contains("- Segmento de Mercado: fitness"));
}

#[tokio::test]
async fn test_full_pipeline_with_live_collaborators() {
    let llm = ScriptedLLM::new(model_reply());
    let engine = AnalysisEngine::new(Config::default())
        .with_llm(llm.clone())
        .with_research_agent(Arc::new(MarketAgent))
        .with_attachment_source(Arc::new(SessionFiles));

    let report = engine.analyze(&fitness_request()).await;

    let prompt = llm.last_prompt();
    assert!(prompt.contains("62% dos alunos treinam à noite"));
    assert!(prompt.contains("Treinos híbridos"));

    assert_eq!(report.avatar.nome_ficticio, "Rafael Corredor");
    assert_eq!(report.metrics.vendas_necessarias_meta, Some(1200));
    assert_eq!(report.metrics.vendas_mensais_meta, Some(100));

    let budget = report.budget.as_ref().unwrap();
    assert_eq!(budget.leads_possiveis_orcamento, 1000);
    assert_eq!(budget.conversao_necessaria, "10.0%");

    assert_eq!(report.competitors.len(), 2);
    assert_eq!(report.competitors[0].nome, "Smart Fit");
    assert!(report.competitors[0].forcas.contains("forte"));
    assert!(report.competitors[0].fraquezas.contains("Desafio"));

    assert_eq!(report.keywords.dados_reais.len(), 2);
    assert_eq!(
        report.keywords.dados_reais["treino funcional"].trends_web,
        vec!["Treinos híbridos"]
    );

    assert_eq!(report.insights.len(), 8);
    assert!(report.insights[5].starts_with("Web Research: "));

    let metadata = report.metadata.unwrap();
    assert_eq!(metadata.ai_model, "scripted");
    assert!(metadata.websailor_used);
    assert!(metadata.attachments_processed);
    assert!(metadata.degraded.is_empty());
    assert_eq!(metadata.quality_score, 100);
}

#[tokio::test]
async fn test_model_failure_still_enriched() {
    let engine = AnalysisEngine::new(Config::default())
        .with_llm(Arc::new(FailingLLM))
        .with_research_agent(Arc::new(MarketAgent));

    let report = engine.analyze(&fitness_request()).await;

    assert!(!report.avatar.is_empty());
    assert_eq!(report.metrics.vendas_mensais_meta, Some(100));
    assert!(report.insights.iter().any(|i| i.starts_with("Web Research: ")));

    let metadata = report.metadata.unwrap();
    assert_eq!(metadata.ai_model, "Fallback");
    assert_eq!(metadata.degraded.len(), 1);
    assert_eq!(metadata.degraded[0].step, "analysis");
}

#[tokio::test]
async fn test_report_serializes_with_wire_keys() {
    let engine = AnalysisEngine::new(Config::default());
    let report = engine.analyze(&AnalysisRequest::new("saúde")).await;
    let value = serde_json::to_value(&report).unwrap();

    for key in [
        "avatar_ultra_detalhado",
        "escopo",
        "analise_concorrencia_detalhada",
        "estrategia_palavras_chave",
        "metricas_performance_detalhadas",
        "insights_exclusivos",
        "panorama_heuristico",
        "metadata",
    ] {
        assert!(value.get(key).is_some(), "missing {}", key);
    }
}
