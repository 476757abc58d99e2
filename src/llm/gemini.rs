//! Google Gemini `generateContent` client.
//!
//! JSON requests set `responseMimeType: application/json`, which lets the
//! model answer with a bare array as well as an object.

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::types::{ChatRequest, ChatResponse, LlmError, ResponseFormat, join_text};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
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
        let body = build_request(request);
        let response = self
            .http
            .post(format!("{API_BASE}/models/{model}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
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

        parse_response(&text, model)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

fn build_request(request: &ChatRequest) -> GenerateRequest<'_> {
    let contents = request
        .messages
        .iter()
        .map(|m| Content {
            role: Some(if m.role == "assistant" { "model" } else { "user" }),
            parts: vec![Part { text: &m.content }],
        })
        .collect();
    let system_instruction = (!request.system.trim().is_empty())
        .then(|| Content { role: None, parts: vec![Part { text: &request.system }] });
    GenerateRequest {
        contents,
        system_instruction,
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            response_mime_type: (request.format == ResponseFormat::Json).then_some("application/json"),
        },
    }
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_response(json: &str, requested_model: &str) -> Result<ChatResponse, LlmError> {
    let api: GenerateResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let candidate = api
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;
    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    let text = join_text(parts.iter().filter_map(|p| p.text.as_deref()))?;
    let (input_tokens, output_tokens) = api
        .usage_metadata
        .map_or((0, 0), |u| (u.prompt_token_count, u.candidates_token_count));

    Ok(ChatResponse {
        text,
        model: api.model_version.unwrap_or_else(|| requested_model.to_owned()),
        stop_reason: candidate.finish_reason.unwrap_or_default(),
        input_tokens,
        output_tokens,
    })
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
