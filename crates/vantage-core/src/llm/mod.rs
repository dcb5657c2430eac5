mod claude;
mod error;
mod gemini;
mod openai;
mod provider;

pub use claude::ClaudeClient;
pub use error::LLMError;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use provider::{Generation, Provider};

use async_trait::async_trait;

/// Trait for Large Language Model providers.
///
/// This abstraction allows swapping between different LLM providers
/// without changing the rest of the code.
///
/// # Supported Providers
///
/// - **Gemini** (default): Google generative language API
/// - **OpenAI-compatible**: OpenAI, Azure, vLLM, OpenRouter, etc.
/// - **Anthropic**: Claude models via Anthropic API
/// - **Ollama**: Local models through the OpenAI-compatible endpoint
///
/// # Example
///
/// ```ignore
/// use vantage_core::llm::{Provider, LLM};
///
/// let llm = Provider::from_config(&config.llm).build()?;
/// let reply = llm.complete("Responda apenas: OK").await?;
/// ```
#[async_trait]
pub trait LLM: Send + Sync {
    /// Complete a prompt and return the response.
    async fn complete(&self, prompt: &str) -> Result<String, LLMError>;

    /// Complete a prompt with a system message.
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LLMError>;

    /// Short label identifying the backing model, recorded in report metadata.
    fn model_name(&self) -> String;
}

/// Blanket implementation for boxed trait objects.
#[async_trait]
impl LLM for Box<dyn LLM> {
    async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        (**self).complete(prompt).await
    }

    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LLMError> {
        (**self).complete_with_system(system, prompt).await
    }

    fn model_name(&self) -> String {
        (**self).model_name()
    }
}
