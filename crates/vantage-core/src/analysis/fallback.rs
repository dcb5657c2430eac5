//! Canned reports for when the model cannot be used.

use chrono::Utc;

use super::report::{
    ActionPhase, ActionPlan, AnalysisReport, Avatar, Demographics, FinancialScenarios,
    KeywordStrategy, MarketIntelligence, PerformanceMetrics, ReportMetadata, Scenario, Scope,
};
use super::request::format_amount;

const FALLBACK_MODEL: &str = "Fallback";
const EMERGENCY_MODEL: &str = "Emergency";
const EMERGENCY_QUALITY: u32 = 20;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn metadata(ai_model: &str, quality_score: u32) -> ReportMetadata {
    ReportMetadata {
        processing_time_seconds: 0.0,
        ai_model: ai_model.to_string(),
        generated_at: Utc::now(),
        quality_score,
        data_sources: Vec::new(),
        websailor_used: false,
        attachments_processed: false,
        qualidade_dados: String::new(),
        confiabilidade: String::new(),
        degraded: Vec::new(),
        note: None,
        error: None,
    }
}

/// Simplified analysis used as the base when the model reply is unusable.
pub fn fallback_report(
    segment: &str,
    product: &str,
    price: Option<f64>,
    reason: &str,
) -> AnalysisReport {
    let price = price.filter(|p| p.is_finite() && *p > 0.0);
    let (revenue, profit) = match price {
        Some(p) => (p * 50.0, p * 20.0),
        None => (5000.0, 2000.0),
    };

    let mut primary = vec![format!("{} online", segment)];
    if !product.is_empty() {
        primary.push(product.to_string());
    }

    let mut meta = metadata(FALLBACK_MODEL, 0);
    meta.note = Some(format!("Análise simplificada devido a erro: {}", reason));

    AnalysisReport {
        avatar: Avatar {
            nome_ficticio: "Empreendedor(a) Genérico(a)".to_string(),
            perfil_demografico: Demographics {
                idade: "30-45 anos".to_string(),
                genero: "Ambos".to_string(),
                renda: "R$ 3.000 - R$ 10.000".to_string(),
                ocupacao: "Pequeno(a) empresário(a) ou profissional liberal".to_string(),
                ..Demographics::default()
            },
            dores_especificas: strings(&[
                "Falta de tempo",
                "Dificuldade em atrair clientes",
                "Insegurança financeira",
            ]),
            desejos_profundos: strings(&[
                "Liberdade financeira",
                "Mais tempo livre",
                "Reconhecimento profissional",
            ]),
            ..Avatar::default()
        },
        scope: Scope {
            posicionamento_mercado: format!("Solução para {} focada em resultados.", segment),
            proposta_valor: format!("Ajuda {} a crescer e ter mais lucro.", segment),
            diferenciais_competitivos: strings(&["Suporte de qualidade", "Metodologia comprovada"]),
            ..Scope::default()
        },
        keywords: KeywordStrategy {
            palavras_primarias: primary,
            palavras_secundarias: strings(&["marketing digital", "vendas online"]),
            ..KeywordStrategy::default()
        },
        metrics: PerformanceMetrics {
            kpis_essenciais: strings(&["Vendas", "Lucro"]),
            projecoes_financeiras: FinancialScenarios {
                cenario_realista: Some(Scenario {
                    receita_mensal: format!("R$ {}", format_amount(revenue)),
                    lucro_mensal: format!("R$ {}", format_amount(profit)),
                    ..Scenario::default()
                }),
                ..FinancialScenarios::default()
            },
            ..PerformanceMetrics::default()
        },
        intelligence: MarketIntelligence {
            tendencias_atuais: strings(&["Digitalização", "Automação"]),
            oportunidades_identificadas: strings(&["Nicho de mercado", "Novos canais"]),
            ..MarketIntelligence::default()
        },
        action_plan: ActionPlan {
            fases: vec![ActionPhase {
                nome: "Fase Inicial".to_string(),
                atividades: strings(&["Planejamento", "Execução"]),
                ..ActionPhase::default()
            }],
            ..ActionPlan::default()
        },
        insights: strings(&[
            "Foco no cliente é fundamental.",
            "A inovação é chave para o sucesso.",
        ]),
        metadata: Some(meta),
        ..AnalysisReport::default()
    }
}

/// Minimal report returned when the pipeline itself fails.
pub fn emergency_report(segment: &str, error: &str) -> AnalysisReport {
    let mut meta = metadata(EMERGENCY_MODEL, EMERGENCY_QUALITY);
    meta.error = Some(error.to_string());

    AnalysisReport {
        avatar: Avatar {
            nome_ficticio: format!("Empreendedor {}", segment),
            perfil_demografico: Demographics {
                idade: "30-45 anos".to_string(),
                ocupacao: format!("Profissional de {}", segment),
                ..Demographics::default()
            },
            dores_especificas: strings(&[
                "Falta de resultados consistentes",
                "Dificuldade em escalar o negócio",
            ]),
            ..Avatar::default()
        },
        insights: vec![
            "Análise gerada em modo de emergência".to_string(),
            format!("Erro no processamento: {}", error),
            "Recomenda-se executar nova análise com dados completos".to_string(),
        ],
        metadata: Some(meta),
        ..AnalysisReport::default()
    }
}
