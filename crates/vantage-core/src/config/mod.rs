//! Configuration management for Vantage.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `vantage.toml` file
//! 3. User config `~/.config/vantage/config.toml`
//! 4. Built-in defaults (lowest priority)
//!
//! The resulting [`Config`] is built once at startup and handed to each
//! component's constructor. Integrations whose settings are missing are
//! simply not constructed; the pipeline falls back to heuristics for them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration.
    pub llm: LLMConfig,

    /// Web research agent configuration.
    pub research: ResearchConfig,

    /// Attachment service configuration.
    pub attachments: AttachmentConfig,

    /// Persistence configuration.
    pub storage: StorageConfig,

    /// Analysis pipeline tuning.
    pub analysis: AnalysisConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./vantage.toml` (project local)
    /// 2. `~/.config/vantage/config.toml` (user config)
    /// 3. Falls back to defaults
    ///
    /// Environment overrides are applied in every case.
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("vantage.toml").exists() {
            return Self::from_file("vantage.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("vantage").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Split from [`Config::apply_env_overrides`] so tests can supply their
    /// own variables without touching the process environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // LLM overrides
        if let Some(provider) = lookup("VANTAGE_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("VANTAGE_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(url) = lookup("VANTAGE_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(key) = lookup("VANTAGE_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(secs) = lookup("VANTAGE_LLM_TIMEOUT_SECS") {
            if let Ok(n) = secs.parse() {
                self.llm.timeout_secs = n;
            }
        }

        // Research overrides
        if let Some(url) = lookup("VANTAGE_RESEARCH_URL") {
            self.research.base_url = Some(url);
        }
        if let Some(key) = lookup("VANTAGE_RESEARCH_API_KEY") {
            self.research.api_key = Some(key);
        }
        if let Some(secs) = lookup("VANTAGE_RESEARCH_TIMEOUT_SECS") {
            if let Ok(n) = secs.parse() {
                self.research.timeout_secs = n;
            }
        }
        if let Some(flag) = lookup("WEBSAILOR_ENABLED") {
            self.research.enabled = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        // Attachment overrides
        if let Some(url) = lookup("VANTAGE_ATTACHMENTS_URL") {
            self.attachments.base_url = Some(url);
        }

        // Storage overrides
        if let Some(url) = lookup("SUPABASE_URL") {
            self.storage.url = Some(url);
            if self.storage.backend == DEFAULT_STORAGE_BACKEND {
                self.storage.backend = "supabase".to_string();
            }
        }
        if let Some(key) = lookup("SUPABASE_SERVICE_ROLE_KEY") {
            self.storage.service_key = Some(key);
        }
        if let Some(backend) = lookup("VANTAGE_STORAGE_BACKEND") {
            self.storage.backend = backend;
        }
        if let Some(dir) = lookup("VANTAGE_DATA_DIR") {
            self.storage.data_dir = dir;
        }

        // Server overrides
        if let Some(host) = lookup("VANTAGE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("VANTAGE_PORT") {
            if let Ok(n) = port.parse() {
                self.server.port = n;
            }
        }
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.analysis.max_cac_ratio) {
            return Err(ConfigError::Invalid(format!(
                "analysis.max_cac_ratio must be within 0..=1, got {}",
                self.analysis.max_cac_ratio
            )));
        }
        if self.analysis.cost_per_lead < 0.0 {
            return Err(ConfigError::Invalid(
                "analysis.cost_per_lead must not be negative".to_string(),
            ));
        }
        if self.research.max_competitors == 0 || self.research.max_keywords == 0 {
            return Err(ConfigError::Invalid(
                "research.max_competitors and research.max_keywords must be at least 1"
                    .to_string(),
            ));
        }
        if self.research.max_queries == 0 {
            return Err(ConfigError::Invalid(
                "research.max_queries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    /// Provider name: "gemini", "openai", "anthropic" or "ollama".
    pub provider: String,

    /// Model name (provider-specific).
    pub model: Option<String>,

    /// Base URL for API (for openai-compatible providers).
    pub base_url: Option<String>,

    /// API key (can also be set via environment variable).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Maximum tokens for response.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling.
    pub top_p: f32,

    /// Top-k sampling (Gemini only).
    pub top_k: u32,

    /// Upper bound for one generation call, in seconds.
    pub timeout_secs: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            model: None,
            base_url: None,
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

impl LLMConfig {
    /// Get the model name, falling back to provider defaults.
    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| match self.provider.as_str() {
            "anthropic" | "claude" => DEFAULT_ANTHROPIC_MODEL.to_string(),
            "ollama" => DEFAULT_OLLAMA_MODEL.to_string(),
            "openai" => DEFAULT_OPENAI_MODEL.to_string(),
            _ => DEFAULT_GEMINI_MODEL.to_string(),
        })
    }

    /// Get the base URL, falling back to provider defaults.
    pub fn base_url_or_default(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| match self.provider.as_str() {
            "anthropic" | "claude" => DEFAULT_ANTHROPIC_URL.to_string(),
            "ollama" => DEFAULT_OLLAMA_URL.to_string(),
            "openai" => DEFAULT_OPENAI_URL.to_string(),
            _ => DEFAULT_GEMINI_URL.to_string(),
        })
    }

    /// Get API key from config or environment.
    pub fn api_key_or_env(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("VANTAGE_LLM_API_KEY").ok())
            .or_else(|| match self.provider.as_str() {
                "anthropic" | "claude" => std::env::var("ANTHROPIC_API_KEY").ok(),
                "openai" => std::env::var("OPENAI_API_KEY").ok(),
                "ollama" => None,
                _ => std::env::var("GEMINI_API_KEY").ok(),
            })
    }

    /// The generation timeout as a [`std::time::Duration`].
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Web research agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Whether the research agent may be used at all.
    pub enabled: bool,

    /// Base URL of the research agent service.
    pub base_url: Option<String>,

    /// Bearer token for the research agent.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Maximum number of queries issued per analysis.
    pub max_queries: usize,

    /// Pages visited per market query.
    pub max_pages: u32,

    /// Link depth per market query.
    pub depth: u32,

    /// Pages visited per competitor query.
    pub competitor_pages: u32,

    /// Pages visited per keyword query.
    pub keyword_pages: u32,

    /// Competitors researched per analysis.
    pub max_competitors: usize,

    /// Keywords researched per analysis.
    pub max_keywords: usize,

    /// Request timeout for the research agent, in seconds.
    pub timeout_secs: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            api_key: None,
            max_queries: DEFAULT_MAX_QUERIES,
            max_pages: DEFAULT_RESEARCH_PAGES,
            depth: DEFAULT_RESEARCH_DEPTH,
            competitor_pages: DEFAULT_COMPETITOR_PAGES,
            keyword_pages: DEFAULT_KEYWORD_PAGES,
            max_competitors: DEFAULT_MAX_COMPETITORS,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            timeout_secs: DEFAULT_RESEARCH_TIMEOUT_SECS,
        }
    }
}

impl ResearchConfig {
    /// True when an agent endpoint is configured and research is enabled.
    pub fn is_available(&self) -> bool {
        self.enabled && self.base_url.is_some()
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Attachment service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentConfig {
    /// Base URL of the attachment service.
    pub base_url: Option<String>,

    /// Maximum characters of extracted text collected per session.
    pub max_collected_chars: usize,

    /// Request timeout for the attachment service, in seconds.
    pub timeout_secs: u64,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            max_collected_chars: DEFAULT_MAX_COLLECTED_CHARS,
            timeout_secs: DEFAULT_ATTACHMENTS_TIMEOUT_SECS,
        }
    }
}

impl AttachmentConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend: "none", "supabase" or "file".
    pub backend: String,

    /// Project URL for the supabase backend.
    pub url: Option<String>,

    /// Service role key for the supabase backend.
    #[serde(skip_serializing)]
    pub service_key: Option<String>,

    /// Table holding analysis records.
    pub table: String,

    /// Base directory for the file backend.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_STORAGE_BACKEND.to_string(),
            url: None,
            service_key: None,
            table: DEFAULT_TABLE.to_string(),
            data_dir: DEFAULT_DATA_DIR.to_string(),
        }
    }
}

impl StorageConfig {
    /// Get the full path to the analyses directory of the file backend.
    pub fn analyses_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DEFAULT_ANALYSES_DIR)
    }
}

/// Analysis pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Attachment characters embedded in the prompt.
    pub prompt_attachment_chars: usize,

    /// Assumed cost per lead used for budget projections.
    pub cost_per_lead: f64,

    /// Share of the price allowed as customer acquisition cost.
    pub max_cac_ratio: f64,

    /// Research insights appended to the report.
    pub max_web_insights: usize,

    /// Research insights quoted per query in the prompt.
    pub insights_per_query: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            prompt_attachment_chars: DEFAULT_PROMPT_ATTACHMENT_CHARS,
            cost_per_lead: DEFAULT_COST_PER_LEAD,
            max_cac_ratio: DEFAULT_MAX_CAC_RATIO,
            max_web_insights: DEFAULT_MAX_WEB_INSIGHTS,
            insights_per_query: DEFAULT_INSIGHTS_PER_QUERY,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,

    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}
