//! OpenAI-compatible `/chat/completions` client.
//!
//! Works against any endpoint speaking the chat-completions protocol via
//! `LLM_OPENAI_BASE_URL`. JSON requests set `response_format`, which only
//! guarantees a top-level object; callers must accept wrapped arrays.

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::types::{ChatRequest, ChatResponse, LlmError, ResponseFormat, join_text};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        Ok(Self { http: super::http_client(timeouts)?, api_key, base_url })
    }

    /// # Errors
    ///
    /// Returns an error on transport failure, non-200 status or an
    /// unparseable body.
    pub async fn chat(&self, model: &str, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let messages = build_messages(request);
        let body = CcRequest {
            model,
            max_tokens: request.max_tokens,
            messages: &messages,
            temperature: request.temperature,
            response_format: (request.format == ResponseFormat::Json).then_some(CcResponseFormat { kind: "json_object" }),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [CcMessage<'a>],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<CcResponseFormat>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct CcMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CcResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CcResponse {
    model: String,
    choices: Vec<CcChoice>,
    #[serde(default)]
    usage: Option<CcUsage>,
}

#[derive(Deserialize)]
struct CcChoice {
    message: CcChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CcChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct CcUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

fn build_messages(request: &ChatRequest) -> Vec<CcMessage<'_>> {
    let mut out = Vec::with_capacity(request.messages.len() + 1);
    if !request.system.trim().is_empty() {
        out.push(CcMessage { role: "system", content: &request.system });
    }
    out.extend(request.messages.iter().map(|m| CcMessage { role: &m.role, content: &m.content }));
    out
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_response(json: &str) -> Result<ChatResponse, LlmError> {
    let api: CcResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let choice = api
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::ApiParse("response has no choices".into()))?;
    let text = join_text(choice.message.content.as_deref())?;
    let (input_tokens, output_tokens) = api
        .usage
        .map_or((0, 0), |u| (u.prompt_tokens, u.completion_tokens));

    Ok(ChatResponse {
        text,
        model: api.model,
        stop_reason: choice.finish_reason.unwrap_or_default(),
        input_tokens,
        output_tokens,
    })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
