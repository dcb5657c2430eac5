//! Prompt assembly for the market analysis request.

use super::request::{format_amount, AnalysisRequest};
use crate::attachments::{truncate_chars, AttachmentContext};
use crate::config::AnalysisConfig;
use crate::market::MarketSnapshot;
use crate::research::ResearchDigest;

/// System message for providers that accept one.
pub const SYSTEM_PROMPT: &str = "Você é um consultor de mercado de elite, especialista em análise \
de mercado, marketing estratégico e psicologia do consumidor no Brasil. Responda sempre com um \
único objeto JSON válido, sem texto antes ou depois.";

const PREAMBLE: &str = "Você é um especialista em análise de mercado ultra-detalhada, marketing \
estratégico e psicologia do consumidor. Sua tarefa é gerar uma análise de mercado completa e \
acionável, com o triplo da profundidade e insights que uma análise comum. Pense como um consultor \
de alto nível que não deixa pedra sobre pedra.";

const OUTPUT_RULE: &str = "Gere a saída em formato JSON, seguindo a estrutura fornecida. Seja \
EXTREMAMENTE detalhado e específico em cada seção. Não use placeholders ou texto genérico. Crie \
conteúdo original e aprofundado para cada campo.";

const SPECIALIZED_INSTRUCTIONS: &str = "### INSTRUÇÕES ESPECIALIZADAS:

Aplique as técnicas do MESTRE DA PERSUASÃO VISCERAL para criar um avatar ultra-detalhado que vai \
muito além dos dados demográficos. Mergulhe nas dores mais profundas, desejos secretos, medos \
paralisantes e frustrações diárias. Use a linguagem que os leads realmente usam, não a que o \
usuário acha que eles usam.

Use os DRIVERS MENTAIS para identificar gatilhos psicológicos específicos que podem ser ativados. \
Crie pelo menos 5 drivers customizados para este avatar específico.

Desenvolva PROVAS VISUAIS (PROVIs) que transformem conceitos abstratos em experiências físicas \
memoráveis. Sugira pelo menos 3 demonstrações práticas.";

const GUIDELINES: &str = "### DIRETRIZES IMPORTANTES:

1. **Seja ULTRA-ESPECÍFICO**: Use dados concretos, números, percentuais
2. **Base-se em DADOS REAIS**: Use o contexto de pesquisa fornecido
3. **Seja PRÁTICO**: Forneça ações executáveis
4. **Seja INOVADOR**: Identifique oportunidades não óbvias
5. **Mantenha COERÊNCIA**: Todos os dados devem ser consistentes
6. **Use LINGUAGEM PROFISSIONAL**: Tom consultivo e especializado

Gere APENAS o JSON válido, sem texto adicional antes ou depois.";

const NOT_INFORMED: &str = "Não informado";

/// The JSON shape the model is asked to fill in.
pub const ANALYSIS_SCHEMA: &str = r#"{
  "avatar_ultra_detalhado": {
    "nome_ficticio": "[Nome de Persona, ex: Ana Empreendedora Digital]",
    "perfil_demografico": {
      "idade": "[Faixa etária detalhada, ex: 28-35 anos]",
      "genero": "[Gênero predominante ou 'Ambos']",
      "renda": "[Faixa de renda mensal, ex: R$ 5.000 - R$ 15.000]",
      "escolaridade": "[Nível de escolaridade]",
      "localizacao": "[Regiões ou tipos de cidade]",
      "estado_civil": "[Estado civil comum]",
      "ocupacao": "[Profissão ou tipo de empreendedor]"
    },
    "perfil_psicografico": {
      "personalidade": "[Traços de personalidade]",
      "valores": "[Valores fundamentais]",
      "interesses": "[Interesses além do negócio]",
      "estilo_vida": "[Descrição do estilo de vida]",
      "comportamento_compra": "[Como toma decisões de compra]",
      "influenciadores": "[Figuras de autoridade que segue]"
    },
    "resumo_jornada_dor": "[Narrativa detalhada da dor]",
    "dores_especificas": ["[Dor 1]", "[Dor 2]", "[Dor 3]", "[Dor 4]", "[Dor 5]"],
    "desejos_profundos": ["[Desejo 1]", "[Desejo 2]", "[Desejo 3]", "[Desejo 4]", "[Desejo 5]"],
    "medos_paralisantes": ["[Medo 1]", "[Medo 2]", "[Medo 3]", "[Medo 4]"],
    "frustracoes_diarias": ["[Frustração 1]", "[Frustração 2]", "[Frustração 3]", "[Frustração 4]"],
    "linguagem_interna_externa": {
      "frases_dores": ["[Frase usada para descrever a dor]"],
      "frases_desejos": ["[Frase usada para descrever o desejo]"],
      "metaforas_comuns": ["[Metáfora recorrente]"],
      "fontes_confianca": ["[Fonte de informação confiável]"]
    },
    "objecoes_reais": ["[Objeção 1]", "[Objeção 2]", "[Objeção 3]"],
    "dia_perfeito": "[Narrativa do dia perfeito após a transformação]",
    "pior_pesadelo": "[Narrativa do pior pesadelo sem a solução]"
  },
  "escopo": {
    "posicionamento_mercado": "[Posicionamento ideal no mercado]",
    "proposta_valor": "[Proposta de valor única e irresistível]",
    "diferenciais_competitivos": ["[Diferencial 1]", "[Diferencial 2]", "[Diferencial 3]", "[Diferencial 4]"]
  },
  "analise_concorrencia_detalhada": [],
  "estrategia_palavras_chave": {
    "palavras_primarias": ["[Palavra-chave 1]", "[Palavra-chave 2]", "[Palavra-chave 3]"],
    "palavras_secundarias": ["[Palavra-chave 1]", "[Palavra-chave 2]", "[Palavra-chave 3]"],
    "palavras_cauda_longa": ["[Palavra-chave 1]", "[Palavra-chave 2]", "[Palavra-chave 3]"],
    "dados_reais": {}
  },
  "metricas_performance_detalhadas": {
    "kpis_essenciais": ["[KPI 1 - Meta]", "[KPI 2 - Meta]", "[KPI 3 - Meta]", "[KPI 4 - Meta]"],
    "projecoes_financeiras": {
      "cenario_conservador": {
        "vendas_mensais": "[Número de vendas]",
        "receita_mensal": "[Valor]",
        "lucro_mensal": "[Valor]",
        "roi_estimado": "[Percentual]"
      },
      "cenario_realista": {
        "vendas_mensais": "[Número de vendas]",
        "receita_mensal": "[Valor]",
        "lucro_mensal": "[Valor]",
        "roi_estimado": "[Percentual]"
      },
      "cenario_otimista": {
        "vendas_mensais": "[Número de vendas]",
        "receita_mensal": "[Valor]",
        "lucro_mensal": "[Valor]",
        "roi_estimado": "[Percentual]"
      }
    },
    "tempo_retorno_investimento": "[Estimativa, ex: 3 a 6 meses]"
  },
  "funil_vendas_otimizado": {
    "etapas": [
      {
        "nome": "Consciência (Topo do Funil)",
        "atividades": ["[Atividade 1]", "[Atividade 2]"],
        "metricas": ["[Métrica 1]"]
      },
      {
        "nome": "Engajamento (Meio do Funil)",
        "atividades": ["[Atividade 1]", "[Atividade 2]"],
        "metricas": ["[Métrica 1]"]
      },
      {
        "nome": "Conversão (Fundo do Funil)",
        "atividades": ["[Atividade 1]", "[Atividade 2]"],
        "metricas": ["[Métrica 1]"]
      }
    ]
  },
  "inteligencia_mercado": {
    "tendencias_atuais": ["[Tendência 1]", "[Tendência 2]", "[Tendência 3]"],
    "oportunidades_identificadas": ["[Oportunidade 1]", "[Oportunidade 2]", "[Oportunidade 3]"],
    "ameacas_desafios": ["[Ameaça 1]", "[Ameaça 2]", "[Ameaça 3]"],
    "recomendacoes_estrategicas": ["[Recomendação 1]", "[Recomendação 2]", "[Recomendação 3]"]
  },
  "plano_acao_detalhado": {
    "fases": [
      {
        "nome": "Fase 1: Validação e Estruturação (Mês 1-2)",
        "objetivo": "[Objetivo da fase]",
        "atividades": ["[Atividade 1]", "[Atividade 2]", "[Atividade 3]"],
        "kpis_fase": ["[KPI 1]", "[KPI 2]"]
      },
      {
        "nome": "Fase 2: Lançamento e Otimização (Mês 3-6)",
        "objetivo": "[Objetivo da fase]",
        "atividades": ["[Atividade 1]", "[Atividade 2]", "[Atividade 3]"],
        "kpis_fase": ["[KPI 1]", "[KPI 2]"]
      },
      {
        "nome": "Fase 3: Escala e Expansão (Mês 7-12)",
        "objetivo": "[Objetivo da fase]",
        "atividades": ["[Atividade 1]", "[Atividade 2]", "[Atividade 3]"],
        "kpis_fase": ["[KPI 1]", "[KPI 2]"]
      }
    ]
  },
  "insights_exclusivos": ["[Insight 1]", "[Insight 2]", "[Insight 3]", "[Insight 4]", "[Insight 5]"]
}"#;

/// Everything the prompt may embed.
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub request: &'a AnalysisRequest,
    pub attachments: Option<&'a AttachmentContext>,
    pub research: Option<&'a ResearchDigest>,
    pub market: Option<&'a MarketSnapshot>,
}

impl<'a> PromptInputs<'a> {
    pub fn new(request: &'a AnalysisRequest) -> Self {
        Self {
            request,
            attachments: None,
            research: None,
            market: None,
        }
    }
}

/// Builds the analysis prompt.
pub struct PromptBuilder {
    attachment_chars: usize,
    insights_per_query: usize,
}

impl PromptBuilder {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            attachment_chars: config.prompt_attachment_chars,
            insights_per_query: config.insights_per_query,
        }
    }

    /// Sections without source data are left out entirely.
    pub fn build(&self, inputs: &PromptInputs<'_>) -> String {
        let mut parts: Vec<String> = vec![PREAMBLE.to_string(), OUTPUT_RULE.to_string()];

        parts.push("\n### DADOS DE ENTRADA DO USUÁRIO:\n".to_string());
        parts.extend(input_lines(inputs.request));

        if let Some(attachments) = inputs.attachments.filter(|a| !a.is_empty()) {
            parts.push("\n### CONTEÚDO EXTRAÍDO DE ANEXOS INTELIGENTES:\n".to_string());
            parts.push(format!(
                "```text\n{}\n```",
                truncate_chars(&attachments.content, self.attachment_chars)
            ));
            parts.push(
                "Analise este conteúdo para extrair informações relevantes para a análise de \
                 mercado, avatar, concorrência e estratégias."
                    .to_string(),
            );
        }

        if let Some(research) = inputs.research.filter(|r| !r.is_empty()) {
            parts.push("\n### RESULTADOS DA PESQUISA PROFUNDA (WEBSAILOR):\n".to_string());
            parts.extend(self.research_lines(research));
            parts.push(
                "Incorpore estas informações da pesquisa web para enriquecer todas as seções da \
                 análise, especialmente as tendências, oportunidades e análise de concorrência."
                    .to_string(),
            );
        }

        if let Some(market) = inputs.market {
            parts.push("\n### INTELIGÊNCIA DE MERCADO:\n".to_string());
            parts.extend(market.prompt_lines());
        }

        parts.push(format!("\n{}", SPECIALIZED_INSTRUCTIONS));

        parts.push(
            "\n### ESTRUTURA DE SAÍDA JSON (PREENCHA CADA CAMPO COM DETALHES EXAUSTIVOS):\n"
                .to_string(),
        );
        parts.push(format!("```json\n{}\n```", ANALYSIS_SCHEMA));

        parts.push(format!("\n{}", GUIDELINES));

        parts.join("\n")
    }

    fn research_lines(&self, research: &ResearchDigest) -> Vec<String> {
        let mut insights = Vec::new();
        let mut trends: Vec<&str> = Vec::new();
        let mut opportunities: Vec<&str> = Vec::new();

        for result in &research.results {
            insights.extend(
                result
                    .key_insights
                    .iter()
                    .take(self.insights_per_query)
                    .map(String::as_str),
            );
            push_unique(&mut trends, &result.market_trends);
            push_unique(&mut opportunities, &result.opportunities);
        }

        let mut lines = Vec::new();
        for (title, items) in [
            ("**Insights Chave:**", insights),
            ("**Tendências de Mercado:**", trends),
            ("**Oportunidades Identificadas:**", opportunities),
        ] {
            if items.is_empty() {
                continue;
            }
            lines.push(title.to_string());
            lines.extend(items.into_iter().map(|item| format!("- {}", item)));
        }
        lines
    }
}

fn push_unique<'a>(into: &mut Vec<&'a str>, items: &'a [String]) {
    for item in items {
        if !into.contains(&item.as_str()) {
            into.push(item);
        }
    }
}

fn input_lines(request: &AnalysisRequest) -> Vec<String> {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_INFORMED.to_string());
    let money = |value: Option<f64>| match value {
        Some(v) => format!("R$ {}", format_amount(v)),
        None => NOT_INFORMED.to_string(),
    };

    vec![
        format!("- Segmento de Mercado: {}", text(&request.segment)),
        format!("- Produto/Serviço: {}", text(&request.product)),
        format!("- Preço Sugerido: {}", money(request.price)),
        format!("- Público-Alvo (descrição do usuário): {}", text(&request.audience)),
        format!("- Concorrentes Informados: {}", text(&request.competitors)),
        format!("- Objetivo de Receita: {}", money(request.revenue_goal)),
        format!("- Orçamento de Marketing: {}", money(request.marketing_budget)),
        format!("- Prazo de Lançamento: {}", text(&request.launch_timeframe)),
        format!("- Dados Adicionais do Usuário: {}", text(&request.notes)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisReport;
    use crate::research::ResearchResult;

    fn builder() -> PromptBuilder {
        PromptBuilder::new(&AnalysisConfig::default())
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            product: Some("Mentoria Zeta-42".to_string()),
            price: Some(497.0),
            competitors: Some("Concorrente Kappa".to_string()),
            ..AnalysisRequest::new("Pilates Omega")
        }
    }

    #[test]
    fn test_schema_is_valid_json_report() {
        let value: serde_json::Value = serde_json::from_str(ANALYSIS_SCHEMA).unwrap();
        let report: AnalysisReport = serde_json::from_value(value).unwrap();
        assert!(!report.avatar.is_empty());
        assert_eq!(report.action_plan.fases.len(), 3);
    }

    #[test]
    fn test_minimal_prompt_omits_optional_sections() {
        let request = request();
        let prompt = builder().build(&PromptInputs::new(&request));

        assert!(prompt.contains(ANALYSIS_SCHEMA));
        assert!(prompt.contains("- Preço Sugerido: R$ 497"));
        assert!(prompt.contains("- Prazo de Lançamento: Não informado"));
        assert!(!prompt.contains("ANEXOS"));
        assert!(!prompt.contains("PESQUISA PROFUNDA"));
        assert!(!prompt.contains("INTELIGÊNCIA DE MERCADO"));
    }

    #[test]
    fn test_fields_embedded_once() {
        let request = request();
        let market = MarketSnapshot::build(request.segment(), request.price);
        let mut inputs = PromptInputs::new(&request);
        inputs.market = Some(&market);

        let prompt = builder().build(&inputs);
        for marker in ["Pilates Omega", "Mentoria Zeta-42", "Concorrente Kappa"] {
            assert_eq!(prompt.matches(marker).count(), 1, "{} repeated", marker);
        }
    }

    #[test]
    fn test_attachment_truncated() {
        let request = request();
        let attachments = AttachmentContext {
            count: 1,
            content: "x".repeat(5000),
            types: vec!["pdf".to_string()],
        };
        let mut inputs = PromptInputs::new(&request);
        inputs.attachments = Some(&attachments);

        let prompt = builder().build(&inputs);
        assert!(prompt.contains("### CONTEÚDO EXTRAÍDO DE ANEXOS INTELIGENTES:"));
        assert!(prompt.contains(&"x".repeat(4000)));
        assert!(!prompt.contains(&"x".repeat(4001)));
    }

    #[test]
    fn test_research_section_limits_insights() {
        let request = request();
        let mut result = ResearchResult::new("q1");
        result.key_insights = (1..=5).map(|i| format!("insight-{}", i)).collect();
        result.market_trends = vec!["tendência-a".to_string()];
        let mut other = ResearchResult::new("q2");
        other.market_trends = vec!["tendência-a".to_string()];
        other.opportunities = vec!["oportunidade-b".to_string()];

        let mut digest = ResearchDigest::new();
        digest.insert(result);
        digest.insert(other);

        let mut inputs = PromptInputs::new(&request);
        inputs.research = Some(&digest);
        let prompt = builder().build(&inputs);

        assert!(prompt.contains("**Insights Chave:**"));
        assert!(prompt.contains("- insight-3"));
        assert!(!prompt.contains("insight-4"));
        assert_eq!(prompt.matches("- tendência-a").count(), 1);
        assert!(prompt.contains("- oportunidade-b"));
    }
}
