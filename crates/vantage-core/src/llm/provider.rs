use std::time::Duration;

use crate::config::{
    LLMConfig, DEFAULT_ANTHROPIC_URL, DEFAULT_GEMINI_URL, DEFAULT_OLLAMA_MODEL,
    DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_URL,
};
use super::{ClaudeClient, GeminiClient, LLMError, OpenAIClient, LLM};

/// Sampling and transport settings shared by every provider.
#[derive(Debug, Clone)]
pub struct Generation {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub timeout: Duration,
}

impl From<&LLMConfig> for Generation {
    fn from(config: &LLMConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            timeout: config.timeout(),
        }
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::from(&LLMConfig::default())
    }
}

/// LLM Provider configuration.
#[derive(Debug, Clone)]
pub enum Provider {
    /// Google Gemini (default)
    Gemini {
        api_key: Option<String>,
        model: String,
        base_url: String,
        generation: Generation,
    },
    /// OpenAI-compatible endpoint
    OpenAI {
        base_url: String,
        api_key: Option<String>,
        model: String,
        generation: Generation,
    },
    /// Anthropic Claude
    Anthropic {
        api_key: Option<String>,
        model: String,
        api_url: String,
        generation: Generation,
    },
    /// Local Ollama instance
    Ollama {
        base_url: String,
        model: String,
        generation: Generation,
    },
}

impl Provider {
    /// Creates a provider from LLMConfig.
    ///
    /// Unknown provider names are rejected here so a typo in the config
    /// surfaces at startup instead of at the first analysis.
    pub fn from_config(config: &LLMConfig) -> Result<Self, LLMError> {
        let generation = Generation::from(config);
        let model = config.model_or_default();
        let api_key = config.api_key_or_env();

        let provider = match config.provider.to_lowercase().as_str() {
            "gemini" | "google" => Provider::Gemini {
                api_key,
                model,
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
                generation,
            },
            "openai" => Provider::OpenAI {
                base_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
                api_key,
                model,
                generation,
            },
            "anthropic" | "claude" => Provider::Anthropic {
                api_key,
                model,
                api_url: config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_URL.to_string()),
                generation,
            },
            "ollama" => Provider::Ollama {
                base_url: config
                    .base_url
                    .clone()
                    .or_else(|| {
                        std::env::var("OLLAMA_HOST")
                            .ok()
                            .map(|h| format!("{}/v1", h.trim_end_matches('/')))
                    })
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
                model,
                generation,
            },
            other => return Err(LLMError::UnknownProvider(other.to_string())),
        };

        Ok(provider)
    }

    /// Short provider label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini { .. } => "gemini",
            Provider::OpenAI { .. } => "openai",
            Provider::Anthropic { .. } => "anthropic",
            Provider::Ollama { .. } => "ollama",
        }
    }

    /// Creates an LLM client from the provider configuration.
    ///
    /// Hosted providers need a key; without one the caller should run the
    /// pipeline without a model rather than fail requests later.
    pub fn build(self) -> Result<Box<dyn LLM>, LLMError> {
        match self {
            Provider::Gemini { api_key, model, base_url, generation } => {
                let key = api_key
                    .filter(|k| !k.is_empty())
                    .ok_or(LLMError::MissingApiKey)?;

                Ok(Box::new(
                    GeminiClient::new(key)
                        .with_model(model)
                        .with_base_url(base_url)
                        .with_sampling(generation.temperature, generation.top_p, generation.top_k)
                        .with_max_tokens(generation.max_tokens)
                        .with_timeout(generation.timeout),
                ))
            }

            Provider::OpenAI { base_url, api_key, model, generation } => {
                let key = api_key
                    .filter(|k| !k.is_empty())
                    .ok_or(LLMError::MissingApiKey)?;

                Ok(Box::new(
                    OpenAIClient::new(base_url, key, model)
                        .with_max_tokens(generation.max_tokens)
                        .with_temperature(generation.temperature)
                        .with_timeout(generation.timeout),
                ))
            }

            Provider::Anthropic { api_key, model, api_url, generation } => {
                let key = api_key
                    .filter(|k| !k.is_empty())
                    .ok_or(LLMError::MissingApiKey)?;

                Ok(Box::new(
                    ClaudeClient::new(key)
                        .with_model(model)
                        .with_api_url(api_url)
                        .with_max_tokens(generation.max_tokens)
                        .with_temperature(generation.temperature)
                        .with_timeout(generation.timeout),
                ))
            }

            Provider::Ollama { base_url, model, generation } => Ok(Box::new(
                OpenAIClient::new(base_url, "", model)
                    .with_max_tokens(generation.max_tokens)
                    .with_temperature(generation.temperature)
                    .with_timeout(generation.timeout),
            )),
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Provider::Ollama {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            generation: Generation::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> LLMConfig {
        LLMConfig {
            provider: provider.to_string(),
            ..LLMConfig::default()
        }
    }

    #[test]
    fn test_ollama_provider_build() {
        // Should succeed without API key
        assert!(Provider::default().build().is_ok());
    }

    #[test]
    fn test_gemini_with_key_builds() {
        let mut cfg = config("gemini");
        cfg.api_key = Some("test".to_string());
        let provider = Provider::from_config(&cfg).unwrap();
        assert_eq!(provider.name(), "gemini");

        let llm = provider.build().unwrap();
        assert_eq!(llm.model_name(), "gemini-1.5-flash");
    }

    #[test]
    fn test_gemini_empty_key_rejected() {
        let provider = Provider::Gemini {
            api_key: Some(String::new()),
            model: "gemini-1.5-flash".to_string(),
            base_url: DEFAULT_GEMINI_URL.to_string(),
            generation: Generation::default(),
        };
        assert!(matches!(provider.build(), Err(LLMError::MissingApiKey)));
    }

    #[test]
    fn test_from_config_model_override() {
        let mut cfg = config("ollama");
        cfg.model = Some("mistral".to_string());

        let provider = Provider::from_config(&cfg).unwrap();
        assert!(matches!(provider, Provider::Ollama { ref model, .. } if model == "mistral"));
    }

    #[test]
    fn test_unknown_provider() {
        let result = Provider::from_config(&config("watson"));
        assert!(matches!(result, Err(LLMError::UnknownProvider(name)) if name == "watson"));
    }

    #[test]
    fn test_generation_from_config() {
        let mut cfg = config("gemini");
        cfg.timeout_secs = 12;
        let generation = Generation::from(&cfg);
        assert_eq!(generation.timeout, Duration::from_secs(12));
        assert_eq!(generation.top_k, 40);
    }
}
