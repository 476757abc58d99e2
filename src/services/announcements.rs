//! Broadcasts — assistant-drafted announcements and their publication.

use serde::Deserialize;

use super::assistant::{Assistant, Tone};
use super::notify::{EventBus, Notice};
use crate::error::ErrorCode;
use crate::models::Severity;

/// Characters of the topic shown in the broadcast toast.
const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct Broadcast {
    pub topic: String,
    #[serde(default)]
    pub tone: Tone,
}

#[derive(Debug, thiserror::Error)]
pub enum AnnouncementError {
    #[error("an announcement needs a topic")]
    MissingTopic,
}

impl ErrorCode for AnnouncementError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTopic => "E_TOPIC_REQUIRED",
        }
    }
}

fn topic_of(broadcast: &Broadcast) -> Result<&str, AnnouncementError> {
    let topic = broadcast.topic.trim();
    if topic.is_empty() { Err(AnnouncementError::MissingTopic) } else { Ok(topic) }
}

/// Topic shortened to fit a toast.
#[must_use]
pub fn preview(topic: &str) -> String {
    if topic.chars().count() > PREVIEW_CHARS {
        let head: String = topic.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        topic.to_owned()
    }
}

/// The toast announcing a broadcast: urgent tone raises an alert.
#[must_use]
pub fn broadcast_notice(topic: &str, tone: Tone) -> Notice {
    match tone {
        Tone::Urgent => Notice::new("⚠️ Urgent Announcement", preview(topic), Severity::Alert),
        Tone::Professional | Tone::Friendly => Notice::new("📢 New School Blast", preview(topic), Severity::Success),
    }
}

/// Draft body text for the broadcast. Falls back to the assistant's fixed
/// text on any provider failure.
///
/// # Errors
///
/// Returns [`AnnouncementError::MissingTopic`] for a blank topic.
pub async fn draft(assistant: &Assistant, user_id: &str, broadcast: &Broadcast) -> Result<String, AnnouncementError> {
    let topic = topic_of(broadcast)?;
    Ok(assistant.draft_announcement(user_id, topic, broadcast.tone).await)
}

/// Publish the broadcast to every portal session.
///
/// # Errors
///
/// Returns [`AnnouncementError::MissingTopic`] for a blank topic.
pub fn publish(bus: &EventBus, broadcast: &Broadcast) -> Result<Notice, AnnouncementError> {
    let notice = broadcast_notice(topic_of(broadcast)?, broadcast.tone);
    bus.publish(notice.clone());
    Ok(notice)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::LlmChat;
    use crate::rate_limit::RateLimiter;
    use crate::services::assistant::ANNOUNCEMENT_FALLBACK;
    use crate::state::test_helpers::MockLlm;

    fn broadcast(topic: &str, tone: Tone) -> Broadcast {
        Broadcast { topic: topic.into(), tone }
    }

    #[test]
    fn preview_truncates_past_fifty_chars() {
        assert_eq!(preview("Short topic"), "Short topic");
        let exact = "x".repeat(50);
        assert_eq!(preview(&exact), exact);
        let long = "Winter school timetable changes for all Grade 12 learners";
        assert_eq!(preview(long), "Winter school timetable changes for all Grade 12 l...");
        assert_eq!(preview(&"é".repeat(60)).chars().count(), 53);
    }

    #[test]
    fn urgent_tone_raises_alert() {
        let urgent = broadcast_notice("Water outage", Tone::Urgent);
        assert_eq!(urgent.title, "⚠️ Urgent Announcement");
        assert_eq!(urgent.severity, Severity::Alert);

        for tone in [Tone::Professional, Tone::Friendly] {
            let notice = broadcast_notice("Sports day", tone);
            assert_eq!(notice.title, "📢 New School Blast");
            assert_eq!(notice.severity, Severity::Success);
        }
    }

    #[tokio::test]
    async fn publish_emits_on_bus() {
        let bus = EventBus::new(8);
        let mut rx = bus.receiver();
        let notice = publish(&bus, &broadcast(" Exam venues ", Tone::Friendly)).unwrap();
        assert_eq!(notice.message, "Exam venues");
        assert_eq!(rx.try_recv().unwrap(), notice);
    }

    #[tokio::test]
    async fn blank_topic_is_rejected_everywhere() {
        let bus = EventBus::new(8);
        let mut rx = bus.receiver();
        assert!(publish(&bus, &broadcast("  ", Tone::Urgent)).is_err());
        assert!(rx.try_recv().is_err());

        let assistant = Assistant::new(None, RateLimiter::default());
        let err = draft(&assistant, "u", &broadcast("", Tone::Professional)).await.unwrap_err();
        assert_eq!(err.error_code(), "E_TOPIC_REQUIRED");
    }

    #[tokio::test]
    async fn draft_uses_assistant_or_fallback() {
        let mock = Arc::new(MockLlm::text("Subject: Exams"));
        let assistant = Assistant::new(Some(mock as Arc<dyn LlmChat>), RateLimiter::default());
        let text = draft(&assistant, "u", &broadcast("Exams", Tone::Professional)).await.unwrap();
        assert_eq!(text, "Subject: Exams");

        let offline = Assistant::new(None, RateLimiter::default());
        let text = draft(&offline, "u", &broadcast("Exams", Tone::Professional)).await.unwrap();
        assert_eq!(text, ANNOUNCEMENT_FALLBACK);
    }
}
