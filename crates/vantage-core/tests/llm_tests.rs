use vantage_core::config::{LLMConfig, DEFAULT_OLLAMA_MODEL};
use vantage_core::llm::{ClaudeClient, GeminiClient, LLMError, OpenAIClient, Provider, LLM};

mod clients {
    use super::*;

    #[test]
    fn test_gemini_model_name() {
        let client = GeminiClient::new("test-key").with_model("gemini-1.5-pro");
        assert_eq!(client.model_name(), "gemini-1.5-pro");
    }

    #[test]
    fn test_claude_model_name() {
        let client = ClaudeClient::new("test-key")
            .with_model("claude-3-opus")
            .with_api_url("https://proxy.example.com/v1/messages");
        assert_eq!(client.model_name(), "claude-3-opus");
    }

    #[test]
    fn test_openai_model_name() {
        let client = OpenAIClient::openai("sk-test", "gpt-4o");
        assert_eq!(client.model_name(), "gpt-4o");
    }

    #[test]
    fn test_ollama_model_name() {
        let client = OpenAIClient::ollama("mistral");
        assert_eq!(client.model_name(), "mistral");
    }
}

mod provider {
    use super::*;

    fn config(provider: &str, key: Option<&str>) -> LLMConfig {
        LLMConfig {
            provider: provider.to_string(),
            api_key: key.map(str::to_string),
            ..LLMConfig::default()
        }
    }

    #[test]
    fn test_default_provider_is_local() {
        let provider = Provider::default();
        assert!(matches!(provider, Provider::Ollama { ref model, .. } if model == DEFAULT_OLLAMA_MODEL));
        assert!(provider.build().is_ok());
    }

    #[test]
    fn test_hosted_providers_build_with_key() {
        for name in ["gemini", "openai", "anthropic"] {
            let provider = Provider::from_config(&config(name, Some("key"))).unwrap();
            assert_eq!(provider.name(), name);
            assert!(provider.build().is_ok(), "{} should build", name);
        }
    }

    #[test]
    fn test_aliases() {
        let google = Provider::from_config(&config("google", None)).unwrap();
        assert_eq!(google.name(), "gemini");
        let claude = Provider::from_config(&config("Claude", None)).unwrap();
        assert_eq!(claude.name(), "anthropic");
    }

    #[test]
    fn test_missing_key_rejected() {
        let provider = Provider::OpenAI {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            generation: Default::default(),
        };
        assert!(matches!(provider.build(), Err(LLMError::MissingApiKey)));
    }

    #[test]
    fn test_unknown_provider() {
        assert!(matches!(
            Provider::from_config(&config("watson", None)),
            Err(LLMError::UnknownProvider(_))
        ));
    }
}
