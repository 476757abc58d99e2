//! Conversations — sending messages and asking for reply suggestions.

use time::OffsetDateTime;
use uuid::Uuid;

use super::assistant::Assistant;
use super::clock_hhmm;
use crate::error::ErrorCode;
use crate::models::{Conversation, Message};
use crate::store::{JsonRepository, StoreError};

/// Messages fed to the assistant when suggesting replies.
const SUGGESTION_CONTEXT: usize = 3;

pub type ConversationRepository = JsonRepository<Vec<Conversation>>;

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("message text is empty")]
    EmptyMessage,
    #[error("no conversation with id {0}")]
    UnknownConversation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for MessagingError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "E_MESSAGE_EMPTY",
            Self::UnknownConversation(_) => "E_CONVERSATION_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list(repo: &ConversationRepository) -> Result<Vec<Conversation>, MessagingError> {
    Ok(repo.load().await?)
}

/// Append a message from `sender_id`. The text is kept as typed; it only
/// has to contain something besides whitespace.
///
/// # Errors
///
/// Returns [`MessagingError::EmptyMessage`], an unknown-conversation error,
/// or a store error.
pub async fn send(
    repo: &ConversationRepository,
    conversation_id: &str,
    sender_id: &str,
    text: &str,
) -> Result<Message, MessagingError> {
    send_at(repo, conversation_id, sender_id, text, OffsetDateTime::now_utc()).await
}

pub(crate) async fn send_at(
    repo: &ConversationRepository,
    conversation_id: &str,
    sender_id: &str,
    text: &str,
    at: OffsetDateTime,
) -> Result<Message, MessagingError> {
    if text.trim().is_empty() {
        return Err(MessagingError::EmptyMessage);
    }
    let message = Message {
        id: Uuid::new_v4().to_string(),
        sender_id: sender_id.to_owned(),
        text: text.to_owned(),
        timestamp: clock_hhmm(at),
        is_read: false,
    };
    let appended = message.clone();
    repo.update(|conversations| {
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| MessagingError::UnknownConversation(conversation_id.to_owned()))?;
        conversation.last_message.clone_from(&appended.text);
        conversation.messages.push(appended);
        Ok::<_, MessagingError>(())
    })
    .await?;
    Ok(message)
}

/// The last few message texts, oldest first, one per line.
#[must_use]
pub fn conversation_tail(conversation: &Conversation) -> String {
    let skip = conversation.messages.len().saturating_sub(SUGGESTION_CONTEXT);
    conversation.messages[skip..]
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reply suggestions for a conversation. The assistant never fails; only a
/// missing conversation or a store error is reported.
///
/// # Errors
///
/// Returns an unknown-conversation error or a store error.
pub async fn suggestions(
    repo: &ConversationRepository,
    assistant: &Assistant,
    user_id: &str,
    conversation_id: &str,
) -> Result<Vec<String>, MessagingError> {
    let conversation = list(repo)
        .await?
        .into_iter()
        .find(|c| c.id == conversation_id)
        .ok_or_else(|| MessagingError::UnknownConversation(conversation_id.to_owned()))?;
    Ok(assistant.smart_replies(user_id, &conversation_tail(&conversation)).await)
}

#[cfg(test)]
#[path = "messaging_test.rs"]
mod tests;
