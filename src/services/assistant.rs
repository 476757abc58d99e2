//! Assistant — generative-text drafting with guaranteed fallbacks.
//!
//! DESIGN
//! ======
//! Four operations (announcement draft, attendance analysis, reply
//! suggestions, event description) each build a prompt, go through the
//! rate limiter, call the configured [`LlmChat`] and parse the answer.
//! The public operations never fail: any error (no provider configured,
//! rate limit, transport, non-200, empty or malformed body) is logged at
//! warn and replaced by the operation's documented fallback. The `try_*`
//! variants expose the underlying error for tests and diagnostics.
//!
//! Structured answers are requested in JSON mode. Models still wrap JSON in
//! markdown fences now and then, so fences are stripped before parsing.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{ChatRequest, LlmError};
use crate::models::EventCategory;
use crate::rate_limit::{RateLimitError, RateLimiter};

pub const ANNOUNCEMENT_FALLBACK: &str = "Failed to generate content. Please try again manually.";
pub const EVENT_DESCRIPTION_FALLBACK: &str = "Event details coming soon. Please check back later.";
pub const SMART_REPLY_FALLBACK: [&str; 3] =
    ["Understood, thank you.", "I will check and get back to you.", "Thank you for the update."];

const SYSTEM_PROMPT: &str = "You are the assistant inside a school and university portal. \
                             Answer for administrators, lecturers, students and parents in plain, professional English.";

const ANNOUNCEMENT_MAX_TOKENS: u32 = 1024;
const ANALYSIS_MAX_TOKENS: u32 = 768;
const REPLIES_MAX_TOKENS: u32 = 256;
const EVENT_MAX_TOKENS: u32 = 768;
const MAX_REPLIES: usize = 3;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Urgent,
    Friendly,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Professional => "professional",
            Self::Urgent => "urgent",
            Self::Friendly => "friendly",
        })
    }
}

/// Analysis of an attendance summary for the principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceInsights {
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("LLM not configured")]
    NotConfigured,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("rate limited: {0}")]
    RateLimited(#[from] RateLimitError),
    #[error("malformed answer: {0}")]
    Malformed(String),
}

impl ErrorCode for AssistantError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Llm(_) => "E_LLM_ERROR",
            Self::RateLimited(_) => "E_RATE_LIMITED",
            Self::Malformed(_) => "E_LLM_MALFORMED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable()) || matches!(self, Self::RateLimited(_))
    }
}

// =============================================================================
// PROMPTS
// =============================================================================

fn announcement_prompt(topic: &str, tone: Tone) -> String {
    format!(
        "Generate a professional school announcement for a South African school about: {topic}.\n\
         The tone should be {tone}.\n\
         Include a clear Subject, a detailed Body, and a closing signature section.\n\
         Mention that this is a NexLink automated communication."
    )
}

fn attendance_prompt(summary: &str) -> String {
    format!(
        "Analyze this attendance data for a school: {summary}.\n\
         Provide 3 key insights and 2 recommendations for the school principal.\n\
         Keep it concise and helpful for a South African school context.\n\
         Answer as a JSON object with string arrays \"insights\" and \"recommendations\"."
    )
}

fn replies_prompt(conversation: &str) -> String {
    format!(
        "Context: A conversation between school staff and parents/students.\n\
         Last messages: {conversation}.\n\
         Provide 3 short, professional, and helpful reply suggestions.\n\
         Return them in a JSON array of strings."
    )
}

fn event_prompt(title: &str, category: EventCategory) -> String {
    format!(
        "Create an engaging, professional event description for a school event titled \"{title}\" in the category \"{category}\".\n\
         Mention that parents should RSVP via the NexLink app.\n\
         Tailor it for a South African audience. Include key details like 'What to bring' and 'Arrival time' as placeholders."
    )
}

// =============================================================================
// PARSING
// =============================================================================

/// Remove a surrounding markdown code fence (with optional language tag).
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_insights(text: &str) -> Result<AttendanceInsights, AssistantError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| AssistantError::Malformed(e.to_string()))
}

/// Accept a bare array of strings, or an object holding one (JSON-object
/// modes force a wrapper such as `{"replies": [...]}`).
fn parse_replies(text: &str) -> Result<Vec<String>, AssistantError> {
    let value: serde_json::Value =
        serde_json::from_str(strip_code_fence(text)).map_err(|e| AssistantError::Malformed(e.to_string()))?;
    let items = match &value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => map
            .values()
            .find_map(serde_json::Value::as_array)
            .ok_or_else(|| AssistantError::Malformed("object holds no array".into()))?,
        _ => return Err(AssistantError::Malformed("expected an array of strings".into())),
    };
    let replies: Vec<String> = items
        .iter()
        .filter_map(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_REPLIES)
        .map(str::to_owned)
        .collect();
    if replies.is_empty() {
        return Err(AssistantError::Malformed("no usable replies".into()));
    }
    Ok(replies)
}

fn fallback<T>(operation: &'static str, err: &AssistantError, value: T) -> T {
    warn!(operation, code = err.error_code(), error = %err, "assistant fell back");
    value
}

// =============================================================================
// ASSISTANT
// =============================================================================

#[derive(Clone)]
pub struct Assistant {
    llm: Option<Arc<dyn LlmChat>>,
    limiter: RateLimiter,
}

impl Assistant {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, limiter: RateLimiter) -> Self {
        Self { llm, limiter }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    async fn ask(&self, user_id: &str, request: ChatRequest) -> Result<String, AssistantError> {
        let llm = self.llm.as_ref().ok_or(AssistantError::NotConfigured)?;
        self.limiter.check_and_record(user_id)?;
        let request = request.with_system(SYSTEM_PROMPT);
        let response = llm.chat(&request).await?;
        self.limiter
            .record_tokens(user_id, response.input_tokens + response.output_tokens);
        info!(
            user_id,
            model = %response.model,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "assistant answered"
        );
        Ok(response.text)
    }

    /// # Errors
    ///
    /// Returns the first failure on the way to a draft.
    pub async fn try_draft_announcement(&self, user_id: &str, topic: &str, tone: Tone) -> Result<String, AssistantError> {
        let request = ChatRequest::prompt(announcement_prompt(topic, tone), ANNOUNCEMENT_MAX_TOKENS).with_temperature(0.7);
        Ok(self.ask(user_id, request).await?.trim().to_owned())
    }

    /// Draft an announcement, or the fixed apology text on any failure.
    pub async fn draft_announcement(&self, user_id: &str, topic: &str, tone: Tone) -> String {
        match self.try_draft_announcement(user_id, topic, tone).await {
            Ok(text) => text,
            Err(e) => fallback("draft_announcement", &e, ANNOUNCEMENT_FALLBACK.to_owned()),
        }
    }

    /// # Errors
    ///
    /// Returns the first failure, including an answer that is not the
    /// expected JSON object.
    pub async fn try_analyze_attendance(&self, user_id: &str, summary: &str) -> Result<AttendanceInsights, AssistantError> {
        let request = ChatRequest::prompt(attendance_prompt(summary), ANALYSIS_MAX_TOKENS).json();
        parse_insights(&self.ask(user_id, request).await?)
    }

    /// Insights for the summary, or `None` on any failure.
    pub async fn analyze_attendance(&self, user_id: &str, summary: &str) -> Option<AttendanceInsights> {
        match self.try_analyze_attendance(user_id, summary).await {
            Ok(insights) => Some(insights),
            Err(e) => fallback("analyze_attendance", &e, None),
        }
    }

    /// # Errors
    ///
    /// Returns the first failure, including an answer with no usable strings.
    pub async fn try_smart_replies(&self, user_id: &str, conversation: &str) -> Result<Vec<String>, AssistantError> {
        let request = ChatRequest::prompt(replies_prompt(conversation), REPLIES_MAX_TOKENS).json();
        parse_replies(&self.ask(user_id, request).await?)
    }

    /// Up to three reply suggestions, or three stock replies on any failure.
    pub async fn smart_replies(&self, user_id: &str, conversation: &str) -> Vec<String> {
        match self.try_smart_replies(user_id, conversation).await {
            Ok(replies) => replies,
            Err(e) => fallback("smart_replies", &e, SMART_REPLY_FALLBACK.map(str::to_owned).to_vec()),
        }
    }

    /// # Errors
    ///
    /// Returns the first failure on the way to a description.
    pub async fn try_event_description(
        &self,
        user_id: &str,
        title: &str,
        category: EventCategory,
    ) -> Result<String, AssistantError> {
        let request = ChatRequest::prompt(event_prompt(title, category), EVENT_MAX_TOKENS).with_temperature(0.8);
        Ok(self.ask(user_id, request).await?.trim().to_owned())
    }

    /// Event description, or the "coming soon" text on any failure.
    pub async fn event_description(&self, user_id: &str, title: &str, category: EventCategory) -> String {
        match self.try_event_description(user_id, title, category).await {
            Ok(text) => text,
            Err(e) => fallback("event_description", &e, EVENT_DESCRIPTION_FALLBACK.to_owned()),
        }
    }
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
