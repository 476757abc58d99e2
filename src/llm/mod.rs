//! LLM — multi-provider adapter for the portal assistant.
//!
//! DESIGN
//! ======
//! Configured from environment variables. `LlmClient` dispatches to Gemini,
//! Anthropic or an OpenAI-compatible endpoint based on `LLM_PROVIDER`.
//! Callers depend on the [`LlmChat`] trait so tests can swap in a fake.

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod openai;
pub mod types;

use std::time::Duration;

use config::{LlmConfig, LlmProviderKind, LlmTimeouts};
pub use types::LlmChat;
use types::{ChatRequest, ChatResponse, LlmError};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client for the configured provider.
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
    Gemini(gemini::GeminiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(LlmConfig::from_env()?)
    }

    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = match config.provider {
            LlmProviderKind::Anthropic => {
                LlmProvider::Anthropic(anthropic::AnthropicClient::new(config.api_key, config.timeouts)?)
            }
            LlmProviderKind::OpenAi => LlmProvider::OpenAi(openai::OpenAiClient::new(
                config.api_key,
                config.openai_base_url,
                config.timeouts,
            )?),
            LlmProviderKind::Gemini => LlmProvider::Gemini(gemini::GeminiClient::new(config.api_key, config.timeouts)?),
        };
        Ok(Self { inner, model: config.model })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        match &self.inner {
            LlmProvider::Anthropic(c) => c.chat(&self.model, request).await,
            LlmProvider::OpenAi(c) => c.chat(&self.model, request).await,
            LlmProvider::Gemini(c) => c.chat(&self.model, request).await,
        }
    }
}

fn http_client(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| LlmError::HttpClientBuild(e.to_string()))
}
