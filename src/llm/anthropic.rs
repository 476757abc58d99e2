//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`. Pure parsing in `parse_response`
//! for testability. The API has no JSON mode, so JSON requests get an extra
//! system instruction instead.

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::types::{ChatRequest, ChatResponse, LlmError, Message, ResponseFormat, join_text};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const JSON_INSTRUCTION: &str = "Respond with a single JSON document and nothing else.";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
}

impl AnthropicClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        Ok(Self { http: super::http_client(timeouts)?, api_key })
    }

    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status or an
    /// unparseable body.
    pub async fn chat(&self, model: &str, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let system = system_prompt(request);
        let body = ApiRequest {
            model,
            max_tokens: request.max_tokens,
            system: (!system.is_empty()).then_some(system.as_str()),
            messages: &request.messages,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }

        parse_response(&text)
    }
}

fn system_prompt(request: &ChatRequest) -> String {
    match request.format {
        ResponseFormat::Text => request.system.clone(),
        ResponseFormat::Json if request.system.is_empty() => JSON_INSTRUCTION.to_owned(),
        ResponseFormat::Json => format!("{}\n\n{JSON_INSTRUCTION}", request.system),
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_response(json: &str) -> Result<ChatResponse, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let text = join_text(api.content.iter().filter_map(|block| match block {
        ContentBlock::Text { text } => Some(text.as_str()),
        ContentBlock::Other => None,
    }))?;

    Ok(ChatResponse {
        text,
        model: api.model,
        stop_reason: api.stop_reason.unwrap_or_default(),
        input_tokens: api.usage.input_tokens,
        output_tokens: api.usage.output_tokens,
    })
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
