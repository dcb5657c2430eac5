use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Client-side problems with an analysis request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Segmento de mercado é obrigatório")]
    MissingSegment,
}

/// Business parameters submitted for analysis.
///
/// Field names on the wire are the Portuguese keys used by the web form.
/// Numeric fields accept numbers or strings; anything unparseable is
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(rename = "segmento", default, deserialize_with = "lenient_text")]
    pub segment: Option<String>,

    #[serde(rename = "produto", default, deserialize_with = "lenient_text")]
    pub product: Option<String>,

    #[serde(rename = "preco", default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,

    #[serde(rename = "publico", default, deserialize_with = "lenient_text")]
    pub audience: Option<String>,

    #[serde(rename = "concorrentes", default, deserialize_with = "lenient_text")]
    pub competitors: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub query: Option<String>,

    #[serde(rename = "dados_adicionais", default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,

    #[serde(rename = "objetivo_receita", default, deserialize_with = "lenient_number")]
    pub revenue_goal: Option<f64>,

    #[serde(rename = "orcamento_marketing", default, deserialize_with = "lenient_number")]
    pub marketing_budget: Option<f64>,

    #[serde(rename = "prazo_lancamento", default, deserialize_with = "lenient_text")]
    pub launch_timeframe: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub session_id: Option<String>,
}

impl AnalysisRequest {
    /// Creates a request for the given segment with every other field absent.
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: normalize_text(segment.into()),
            ..Self::default()
        }
    }

    /// Parses a request from an arbitrary JSON body.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Checks the required fields, returning the segment.
    pub fn validate(&self) -> Result<&str, RequestError> {
        self.segment.as_deref().ok_or(RequestError::MissingSegment)
    }

    /// The segment, or an empty string when missing.
    pub fn segment(&self) -> &str {
        self.segment.as_deref().unwrap_or_default()
    }

    pub fn product(&self) -> &str {
        self.product.as_deref().unwrap_or_default()
    }

    pub fn competitors(&self) -> &str {
        self.competitors.as_deref().unwrap_or_default()
    }

    /// Length of the free-form notes in characters.
    pub fn notes_len(&self) -> usize {
        self.notes.as_deref().map(|n| n.chars().count()).unwrap_or(0)
    }
}

/// Parses a user-supplied amount.
///
/// Accepts an optional `R$` prefix and a single `,` as decimal separator.
/// Returns None for empty, unparseable or non-finite input.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_start_matches("R$").trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Formats an amount without a trailing `.0` for whole values.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn normalize_text(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => normalize_text(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().filter(|n| n.is_finite()),
        Some(Value::String(s)) => parse_amount(&s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_portuguese_keys() {
        let request = AnalysisRequest::from_value(json!({
            "segmento": "  saúde ",
            "produto": "Curso online",
            "preco": "197",
            "publico": "Mulheres 30-45",
            "concorrentes": "A, B",
            "objetivo_receita": 120000,
            "orcamento_marketing": "5000,50",
            "prazo_lancamento": "3 meses"
        }))
        .unwrap();

        assert_eq!(request.segment(), "saúde");
        assert_eq!(request.price, Some(197.0));
        assert_eq!(request.revenue_goal, Some(120000.0));
        assert_eq!(request.marketing_budget, Some(5000.5));
        assert_eq!(request.launch_timeframe.as_deref(), Some("3 meses"));
    }

    #[test]
    fn test_invalid_numbers_become_absent() {
        let request = AnalysisRequest::from_value(json!({
            "segmento": "fitness",
            "preco": "",
            "objetivo_receita": "muito",
            "orcamento_marketing": null
        }))
        .unwrap();

        assert_eq!(request.price, None);
        assert_eq!(request.revenue_goal, None);
        assert_eq!(request.marketing_budget, None);
    }

    #[test]
    fn test_missing_segment() {
        let request = AnalysisRequest::from_value(json!({"produto": "x"})).unwrap();
        assert_eq!(request.validate(), Err(RequestError::MissingSegment));

        let blank = AnalysisRequest::from_value(json!({"segmento": "   "})).unwrap();
        assert_eq!(blank.validate(), Err(RequestError::MissingSegment));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("R$ 99,90"), Some(99.9));
        assert_eq!(parse_amount("1500.5"), Some(1500.5));
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("1,2,3"), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(100.0), "100");
        assert_eq!(format_amount(99.9), "99.90");
    }
}
