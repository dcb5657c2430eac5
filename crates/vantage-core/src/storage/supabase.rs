use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{
    ActionPlan, AnalysisReport, AnalysisRequest, Avatar, KeywordStrategy, MarketIntelligence,
    PerformanceMetrics, SalesFunnel, Scope,
};
use crate::config::StorageConfig;
use crate::market::CompetitorProfile;
use crate::record::AnalysisRecord;
use crate::status::AnalysisStatus;

use super::error::StorageError;
use super::AnalysisStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Supabase table accessed through its PostgREST endpoint.
pub struct SupabaseStore {
    base_url: String,
    service_key: String,
    table: String,
    client: Client,
}

impl SupabaseStore {
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            table: table.into(),
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Builds a store when both URL and service key are configured.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| StorageError::Config("supabase backend needs a URL".to_string()))?;
        let key = config
            .service_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| StorageError::Config("supabase backend needs a service key".to_string()))?;

        Ok(Self::new(url, key, &config.table))
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn check(response: Response) -> Result<Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StorageError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AnalysisStore for SupabaseStore {
    async fn insert(&self, record: &AnalysisRecord) -> Result<String, StorageError> {
        let response = self
            .authorized(self.client.post(self.endpoint()))
            .header("Prefer", "return=representation")
            .json(&InsertRow::from(record))
            .send()
            .await?;

        let rows: Vec<Value> = Self::check(response).await?.json().await?;
        rows.first()
            .and_then(|row| row.get("id"))
            .and_then(id_text)
            .ok_or_else(|| StorageError::Api {
                status: 200,
                message: "insert returned no id".to_string(),
            })
    }

    async fn update(&self, record: &AnalysisRecord) -> Result<(), StorageError> {
        let id = record.id.as_deref().ok_or(StorageError::MissingId)?;
        let empty = AnalysisReport::default();
        let report = record.result.as_ref().unwrap_or(&empty);

        let response = self
            .authorized(self.client.patch(self.endpoint()))
            .query(&[("id", format!("eq.{}", id))])
            .json(&UpdateRow::new(record, report))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<AnalysisRecord, StorageError> {
        let response = self
            .authorized(self.client.get(self.endpoint()))
            .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
            .send()
            .await?;

        let rows: Vec<StoredRow> = Self::check(response).await?.json().await?;
        rows.into_iter()
            .next()
            .map(StoredRow::into_record)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Columns written when an analysis starts.
#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    nicho: &'a str,
    produto: Option<&'a str>,
    preco: Option<f64>,
    publico: Option<&'a str>,
    concorrentes: Option<&'a str>,
    dados_adicionais: Option<&'a str>,
    objetivo_receita: Option<f64>,
    orcamento_marketing: Option<f64>,
    prazo_lancamento: Option<&'a str>,
    status: AnalysisStatus,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a AnalysisRecord> for InsertRow<'a> {
    fn from(record: &'a AnalysisRecord) -> Self {
        let input = &record.input;
        Self {
            nicho: input.segment(),
            produto: input.product.as_deref(),
            preco: input.price,
            publico: input.audience.as_deref(),
            concorrentes: input.competitors.as_deref(),
            dados_adicionais: input.notes.as_deref(),
            objetivo_receita: input.revenue_goal,
            orcamento_marketing: input.marketing_budget,
            prazo_lancamento: input.launch_timeframe.as_deref(),
            status: record.status,
            created_at: record.created_at,
        }
    }
}

/// Per-section columns written on completion.
#[derive(Debug, Serialize)]
struct UpdateRow<'a> {
    avatar_data: &'a Avatar,
    positioning_data: &'a Scope,
    competition_data: &'a [CompetitorProfile],
    marketing_data: &'a KeywordStrategy,
    metrics_data: &'a PerformanceMetrics,
    funnel_data: &'a SalesFunnel,
    market_intelligence: &'a MarketIntelligence,
    action_plan: &'a ActionPlan,
    comprehensive_analysis: &'a AnalysisReport,
    status: AnalysisStatus,
    updated_at: DateTime<Utc>,
}

impl<'a> UpdateRow<'a> {
    fn new(record: &AnalysisRecord, report: &'a AnalysisReport) -> Self {
        Self {
            avatar_data: &report.avatar,
            positioning_data: &report.scope,
            competition_data: &report.competitors,
            marketing_data: &report.keywords,
            metrics_data: &report.metrics,
            funnel_data: &report.funnel,
            market_intelligence: &report.intelligence,
            action_plan: &report.action_plan,
            comprehensive_analysis: report,
            status: record.status,
            updated_at: record.updated_at,
        }
    }
}

/// A row as read back from the table.
#[derive(Debug, Deserialize)]
struct StoredRow {
    id: Value,
    #[serde(default)]
    nicho: Option<String>,
    #[serde(default)]
    produto: Option<String>,
    #[serde(default)]
    preco: Option<f64>,
    #[serde(default)]
    publico: Option<String>,
    #[serde(default)]
    concorrentes: Option<String>,
    #[serde(default)]
    dados_adicionais: Option<String>,
    #[serde(default)]
    objetivo_receita: Option<f64>,
    #[serde(default)]
    orcamento_marketing: Option<f64>,
    #[serde(default)]
    prazo_lancamento: Option<String>,
    #[serde(default)]
    status: AnalysisStatus,
    #[serde(default)]
    comprehensive_analysis: Option<AnalysisReport>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl StoredRow {
    fn into_record(self) -> AnalysisRecord {
        let input = AnalysisRequest {
            segment: self.nicho,
            product: self.produto,
            price: self.preco,
            audience: self.publico,
            competitors: self.concorrentes,
            notes: self.dados_adicionais,
            revenue_goal: self.objetivo_receita,
            marketing_budget: self.orcamento_marketing,
            launch_timeframe: self.prazo_lancamento,
            ..AnalysisRequest::default()
        };

        AnalysisRecord {
            id: id_text(&self.id),
            input,
            status: self.status,
            result: self.comprehensive_analysis,
            created_at: self.created_at,
            updated_at: self.updated_at.unwrap_or(self.created_at),
        }
    }
}
