//! Default values for Vantage configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// LLM Defaults
// ============================================================================

/// Default LLM provider.
pub const DEFAULT_LLM_PROVIDER: &str = "gemini";

/// Default max tokens for LLM responses.
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default nucleus sampling value.
pub const DEFAULT_TOP_P: f32 = 0.8;

/// Default top-k sampling value.
pub const DEFAULT_TOP_K: u32 = 40;

/// Upper bound for a single model call, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;

// Gemini defaults
/// Default Gemini API URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default Gemini model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

// OpenAI defaults
/// Default OpenAI API URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

// Anthropic defaults
/// Default Anthropic API URL.
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
/// Default Anthropic model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
/// Default Anthropic API version.
pub const DEFAULT_ANTHROPIC_API_VERSION: &str = "2023-06-01";

// Ollama defaults
/// Default Ollama API URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/v1";
/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

// ============================================================================
// Research Defaults
// ============================================================================

/// Maximum number of research queries issued per analysis.
pub const DEFAULT_MAX_QUERIES: usize = 8;

/// Pages visited per market research query.
pub const DEFAULT_RESEARCH_PAGES: u32 = 7;

/// Link depth followed per market research query.
pub const DEFAULT_RESEARCH_DEPTH: u32 = 2;

/// Pages visited when researching a single competitor.
pub const DEFAULT_COMPETITOR_PAGES: u32 = 3;

/// Pages visited when researching a single keyword.
pub const DEFAULT_KEYWORD_PAGES: u32 = 2;

/// Competitors researched per analysis; the rest keep canned profiles.
pub const DEFAULT_MAX_COMPETITORS: usize = 5;

/// Keywords researched per analysis; the rest keep simulated metrics only.
pub const DEFAULT_MAX_KEYWORDS: usize = 5;

/// Upper bound for a single research agent call, in seconds.
pub const DEFAULT_RESEARCH_TIMEOUT_SECS: u64 = 120;

// ============================================================================
// Attachment Defaults
// ============================================================================

/// Maximum characters of attachment text collected per session.
pub const DEFAULT_MAX_COLLECTED_CHARS: usize = 8000;

/// Upper bound for a single attachment service call, in seconds.
pub const DEFAULT_ATTACHMENTS_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Storage Defaults
// ============================================================================

/// Default persistence backend.
pub const DEFAULT_STORAGE_BACKEND: &str = "none";

/// Default remote table name.
pub const DEFAULT_TABLE: &str = "analyses";

/// Default data directory for the file backend.
pub const DEFAULT_DATA_DIR: &str = ".vantage";

/// Subdirectory holding analysis records for the file backend.
pub const DEFAULT_ANALYSES_DIR: &str = "analyses";

// ============================================================================
// Analysis Defaults
// ============================================================================

/// Attachment characters embedded in the model prompt.
pub const DEFAULT_PROMPT_ATTACHMENT_CHARS: usize = 4000;

/// Assumed cost of a single lead, in BRL.
pub const DEFAULT_COST_PER_LEAD: f64 = 10.0;

/// Share of the price that may be spent acquiring a customer.
pub const DEFAULT_MAX_CAC_RATIO: f64 = 0.3;

/// Research insights appended to the report's insight list.
pub const DEFAULT_MAX_WEB_INSIGHTS: usize = 3;

/// Research insights quoted per query inside the prompt.
pub const DEFAULT_INSIGHTS_PER_QUERY: usize = 3;

// ============================================================================
// Server Defaults
// ============================================================================

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;
