//! Local market heuristics: segment profile, price positioning and
//! canned competition and growth outlooks.

use serde::{Deserialize, Serialize};

use crate::analysis::format_amount;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentProfile {
    pub maturity: String,
    pub competition: String,
    pub growth_rate: String,
    pub key_players: Vec<String>,
    pub avg_ticket: String,
    pub main_channels: Vec<String>,
}

struct SegmentEntry {
    key: &'static str,
    maturity: &'static str,
    competition: &'static str,
    growth_rate: &'static str,
    key_players: &'static [&'static str],
    avg_ticket: &'static str,
    main_channels: &'static [&'static str],
}

static SEGMENTS: [SegmentEntry; 3] = [
    SegmentEntry {
        key: "marketing digital",
        maturity: "Alto",
        competition: "Muito Alta",
        growth_rate: "15-25% ao ano",
        key_players: &["Hotmart", "Monetizze", "Eduzz"],
        avg_ticket: "R$ 297-2.997",
        main_channels: &["Facebook Ads", "Instagram", "YouTube"],
    },
    SegmentEntry {
        key: "saúde",
        maturity: "Médio",
        competition: "Alta",
        growth_rate: "10-20% ao ano",
        key_players: &["Drogarias", "Planos de Saúde", "Clínicas"],
        avg_ticket: "R$ 97-497",
        main_channels: &["Google Ads", "SEO", "Indicações"],
    },
    SegmentEntry {
        key: "educação",
        maturity: "Alto",
        competition: "Alta",
        growth_rate: "20-30% ao ano",
        key_players: &["Coursera", "Udemy", "Alura"],
        avg_ticket: "R$ 197-997",
        main_channels: &["Google Ads", "YouTube", "Parcerias"],
    },
];

static GENERIC_SEGMENT: SegmentEntry = SegmentEntry {
    key: "",
    maturity: "Médio",
    competition: "Média",
    growth_rate: "10-15% ao ano",
    key_players: &["Diversos players regionais"],
    avg_ticket: "R$ 197-997",
    main_channels: &["Digital", "Tradicional"],
};

impl SegmentProfile {
    /// Looks the segment up in the built-in table by substring.
    pub fn for_segment(segment: &str) -> Self {
        let lowered = segment.to_lowercase();
        let entry = SEGMENTS
            .iter()
            .find(|entry| lowered.contains(entry.key))
            .unwrap_or(&GENERIC_SEGMENT);

        Self {
            maturity: entry.maturity.to_string(),
            competition: entry.competition.to_string(),
            growth_rate: entry.growth_rate.to_string(),
            key_players: to_strings(entry.key_players),
            avg_ticket: entry.avg_ticket.to_string(),
            main_channels: to_strings(entry.main_channels),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingAnalysis {
    pub price_positioning: String,
    pub market_comparison: String,
    pub optimization_suggestions: Vec<String>,
}

impl PricingAnalysis {
    pub fn for_price(price: Option<f64>) -> Self {
        let mut analysis = Self {
            price_positioning: "Não informado".to_string(),
            market_comparison: "Análise indisponível".to_string(),
            optimization_suggestions: Vec::new(),
        };

        let Some(price) = price.filter(|p| *p > 0.0) else {
            return analysis;
        };

        let (positioning, suggestion) = if price < 100.0 {
            ("Baixo (Entrada)", "Considere adicionar valor para justificar preço premium")
        } else if price < 500.0 {
            ("Médio (Competitivo)", "Posição boa para escala, foque em volume")
        } else if price < 2000.0 {
            ("Alto (Premium)", "Justifique valor com diferenciais únicos")
        } else {
            ("Premium (Exclusivo)", "Foque em transformação e resultados excepcionais")
        };

        analysis.price_positioning = positioning.to_string();
        analysis.market_comparison = format!("Preço de R$ {} na faixa {}", format_amount(price), positioning);
        analysis.optimization_suggestions.push(suggestion.to_string());
        analysis
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionLandscape {
    pub competition_level: String,
    pub market_saturation: String,
    pub differentiation_opportunities: Vec<String>,
    pub competitive_advantages: Vec<String>,
}

impl Default for CompetitionLandscape {
    fn default() -> Self {
        Self {
            competition_level: "Média a Alta".to_string(),
            market_saturation: "Parcialmente saturado".to_string(),
            differentiation_opportunities: to_strings(&[
                "Atendimento personalizado",
                "Metodologia exclusiva",
                "Garantias diferenciadas",
                "Comunidade engajada",
            ]),
            competitive_advantages: to_strings(&[
                "Inovação constante",
                "Relacionamento próximo",
                "Resultados comprovados",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthIndicators {
    pub market_trends: Vec<String>,
    pub growth_drivers: Vec<String>,
    pub future_outlook: String,
}

impl Default for GrowthIndicators {
    fn default() -> Self {
        Self {
            market_trends: to_strings(&[
                "Digitalização acelerada",
                "Busca por automação",
                "Personalização em escala",
            ]),
            growth_drivers: to_strings(&[
                "Aumento da demanda online",
                "Necessidade de eficiência",
                "Busca por resultados rápidos",
            ]),
            future_outlook: "Positivo com crescimento sustentado".to_string(),
        }
    }
}

/// Heuristic market picture for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub segment_analysis: SegmentProfile,
    pub pricing_intelligence: PricingAnalysis,
    pub competition_landscape: CompetitionLandscape,
    pub growth_indicators: GrowthIndicators,
}

impl MarketSnapshot {
    pub fn build(segment: &str, price: Option<f64>) -> Self {
        Self {
            segment_analysis: SegmentProfile::for_segment(segment),
            pricing_intelligence: PricingAnalysis::for_price(price),
            competition_landscape: CompetitionLandscape::default(),
            growth_indicators: GrowthIndicators::default(),
        }
    }

    /// Markdown lines for the prompt's market intelligence section.
    pub fn prompt_lines(&self) -> Vec<String> {
        let segment = &self.segment_analysis;
        let pricing = &self.pricing_intelligence;
        let landscape = &self.competition_landscape;
        let growth = &self.growth_indicators;

        let mut lines = vec![
            format!(
                "**Perfil do Segmento:** maturidade {}, concorrência {}, crescimento {}, ticket médio {}",
                segment.maturity, segment.competition, segment.growth_rate, segment.avg_ticket
            ),
            format!("**Principais Players:** {}", segment.key_players.join(", ")),
            format!("**Canais Principais:** {}", segment.main_channels.join(", ")),
            format!("**Posicionamento de Preço:** {}", pricing.price_positioning),
        ];

        if !pricing.optimization_suggestions.is_empty() {
            lines.push(format!(
                "**Sugestões de Preço:** {}",
                pricing.optimization_suggestions.join("; ")
            ));
        }

        lines.push(format!(
            "**Panorama Competitivo:** {} ({})",
            landscape.competition_level, landscape.market_saturation
        ));
        lines.push(format!(
            "**Oportunidades de Diferenciação:** {}",
            landscape.differentiation_opportunities.join(", ")
        ));
        lines.push(format!(
            "**Indicadores de Crescimento:** {}; perspectiva: {}",
            growth.market_trends.join(", "),
            growth.future_outlook
        ));

        lines
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
