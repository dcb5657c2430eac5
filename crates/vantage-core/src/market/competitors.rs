use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::lenient;
use crate::outcome::Outcome;
use crate::research::{ResearchAgent, ResearchQuery, ResearchSource};

const STRENGTH_MARKERS: [&str; 3] = ["forte", "sucesso", "lider"];
const WEAKNESS_MARKERS: [&str; 3] = ["fraco", "desafio", "falha"];
const STRATEGY_MARKERS: [&str; 3] = ["marketing", "campanha", "publicidade"];

const DEFAULT_STRENGTHS: &str = "Marca estabelecida; Base de clientes consolidada; Presença online forte";
const DEFAULT_WEAKNESSES: &str = "Atendimento ao cliente limitado; Produto genérico; Falta de inovação";
const DEFAULT_STRATEGY: &str = "Foco em Facebook Ads e Instagram; Marketing de conteúdo e SEO";
const DEFAULT_DIFFERENTIATION: &str = "Personalização da experiência; Suporte humanizado; Metodologia exclusiva";
const DEFAULT_MARKET_SHARE: &str = "5-15% do nicho";

/// Typical price bands by segment keyword.
const PRICE_BANDS: [(&str, &str); 6] = [
    ("marketing digital", "R$ 497-2.997"),
    ("saúde", "R$ 197-997"),
    ("fitness", "R$ 97-497"),
    ("finanças", "R$ 297-1.497"),
    ("educação", "R$ 197-897"),
    ("desenvolvimento pessoal", "R$ 297-1.997"),
];
const DEFAULT_PRICE_BAND: &str = "R$ 197-997";

/// One competitor as presented in the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorProfile {
    #[serde(default, deserialize_with = "lenient::text")]
    pub nome: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub produto_servico: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub preco_estimado: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub market_share_estimado: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub forcas: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fraquezas: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub estrategia_marketing: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub oportunidade_diferenciacao: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub sources: Vec<ResearchSource>,
}

impl CompetitorProfile {
    /// A named competitor with placeholder fields, before enrichment.
    fn named(name: &str, segment: &str) -> Self {
        Self {
            nome: name.to_string(),
            produto_servico: format!("Produto/serviço em {}", segment),
            preco_estimado: estimate_price_band(segment).to_string(),
            market_share_estimado: DEFAULT_MARKET_SHARE.to_string(),
            ..Self::default()
        }
    }

    /// The two archetypes used when the user names no competitors.
    pub fn archetypes(segment: &str) -> Vec<Self> {
        vec![
            Self {
                nome: format!("Líder do mercado em {}", segment),
                produto_servico: format!("Curso/consultoria premium em {}", segment),
                preco_estimado: estimate_price_band(segment).to_string(),
                market_share_estimado: "15-25% do nicho".to_string(),
                forcas: "Autoridade estabelecida; Grande base de clientes; Marketing bem estruturado".to_string(),
                fraquezas: "Preço elevado; Atendimento massificado; Pouca inovação".to_string(),
                estrategia_marketing: "Facebook Ads + E-mail marketing + Webinars".to_string(),
                oportunidade_diferenciacao: "Atendimento personalizado e metodologia exclusiva".to_string(),
                sources: Vec::new(),
            },
            Self {
                nome: format!("Challenger em {}", segment),
                produto_servico: format!("Produto digital intermediário em {}", segment),
                preco_estimado: "R$ 197-697".to_string(),
                market_share_estimado: "5-10% do nicho".to_string(),
                forcas: "Preço acessível; Marketing ágil; Inovação constante".to_string(),
                fraquezas: "Menor autoridade; Recursos limitados; Suporte básico".to_string(),
                estrategia_marketing: "Instagram + TikTok + Influenciadores micro".to_string(),
                oportunidade_diferenciacao: "Superior qualidade de conteúdo e suporte premium".to_string(),
                sources: Vec::new(),
            },
        ]
    }

    /// Fills strengths, weaknesses and strategy from research insights,
    /// using canned text for any class with no matching insight.
    fn apply_insights(&mut self, insights: &[String]) {
        let strengths = classify(insights, &STRENGTH_MARKERS, 2);
        let weaknesses = classify(insights, &WEAKNESS_MARKERS, 2);
        let strategy = classify(insights, &STRATEGY_MARKERS, 1);

        self.forcas = strengths.unwrap_or_else(|| DEFAULT_STRENGTHS.to_string());
        self.fraquezas = weaknesses.unwrap_or_else(|| DEFAULT_WEAKNESSES.to_string());
        self.estrategia_marketing = strategy.unwrap_or_else(|| DEFAULT_STRATEGY.to_string());
        self.oportunidade_diferenciacao = DEFAULT_DIFFERENTIATION.to_string();
    }

    /// Canned strengths and weaknesses.
    fn apply_defaults(&mut self) {
        self.apply_insights(&[]);
    }
}

/// Joins up to `limit` insights containing any marker, case-insensitively.
fn classify(insights: &[String], markers: &[&str], limit: usize) -> Option<String> {
    let matched: Vec<&str> = insights
        .iter()
        .filter(|insight| {
            let lowered = insight.to_lowercase();
            markers.iter().any(|m| lowered.contains(m))
        })
        .take(limit)
        .map(String::as_str)
        .collect();

    if matched.is_empty() {
        None
    } else {
        Some(matched.join("; "))
    }
}

/// Price band for a segment, matched by substring.
pub fn estimate_price_band(segment: &str) -> &'static str {
    let lowered = segment.to_lowercase();
    PRICE_BANDS
        .iter()
        .find(|(key, _)| lowered.contains(key))
        .map(|(_, band)| *band)
        .unwrap_or(DEFAULT_PRICE_BAND)
}

/// Splits the user's competitor text on commas, dropping blanks.
pub fn parse_competitor_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds competitor profiles, researching each when an agent is available.
///
/// At most `max_researched` competitors are researched; the rest keep their
/// canned profile.
#[derive(Clone)]
pub struct CompetitorAnalyzer {
    agent: Option<Arc<dyn ResearchAgent>>,
    max_pages: u32,
    max_researched: usize,
}

impl CompetitorAnalyzer {
    pub fn new(agent: Option<Arc<dyn ResearchAgent>>, max_pages: u32, max_researched: usize) -> Self {
        Self {
            agent,
            max_pages,
            max_researched,
        }
    }

    /// Never fails; every returned profile is complete.
    pub async fn analyze(
        &self,
        segment: &str,
        competitors: &str,
        product: &str,
    ) -> Outcome<Vec<CompetitorProfile>> {
        let names = parse_competitor_list(competitors);

        let (profiles, synthesized) = if names.is_empty() {
            debug!("No competitors informed, using archetypes");
            (CompetitorProfile::archetypes(segment), true)
        } else {
            let profiles = names
                .iter()
                .map(|name| CompetitorProfile::named(name, segment))
                .collect();
            (profiles, false)
        };

        let Some(agent) = &self.agent else {
            let profiles = profiles
                .into_iter()
                .map(|mut profile| {
                    if !synthesized {
                        profile.apply_defaults();
                    }
                    profile
                })
                .collect();
            return Outcome::heuristic(profiles, "research agent not configured");
        };

        let mut enriched = Vec::with_capacity(profiles.len());
        let mut researched = 0usize;

        for (index, mut profile) in profiles.into_iter().enumerate() {
            if index >= self.max_researched {
                debug!(competitor = %profile.nome, "Research limit reached, keeping canned profile");
                if !synthesized {
                    profile.apply_defaults();
                }
                enriched.push(profile);
                continue;
            }

            info!(competitor = %profile.nome, "Researching competitor");
            let query = ResearchQuery::new(
                format!(
                    "análise de {} {} {} pontos fortes e fracos estratégia marketing",
                    profile.nome, segment, product
                ),
                self.max_pages,
            )
            .with_context("competitor", &profile.nome)
            .with_context("nicho", segment)
            .with_context("product", product);

            match agent.research(&query).await {
                Ok(result) => {
                    profile.apply_insights(&result.key_insights);
                    profile.sources = result.sources;
                    researched += 1;
                }
                Err(e) => {
                    warn!(competitor = %profile.nome, error = %e, "Competitor research failed");
                    if !synthesized {
                        profile.apply_defaults();
                    }
                }
            }
            enriched.push(profile);
        }

        if researched == 0 {
            Outcome::heuristic(enriched, "every competitor query failed")
        } else {
            Outcome::live(enriched)
        }
    }
}
