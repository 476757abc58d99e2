//! Campus calendar — listing, hosting and RSVPs.
//!
//! Only institution admins and teachers host events. Creating an event and
//! confirming attendance are announced on the bus; withdrawing an RSVP is
//! silent.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::notify::EventBus;
use crate::error::ErrorCode;
use crate::models::{EventCategory, SchoolEvent, Severity, UserProfile, UserRole};
use crate::store::{JsonRepository, StoreError};

pub const DEFAULT_EVENT_DATE: &str = "2025-08-01";
pub const DEFAULT_EVENT_TIME: &str = "08:00";
pub const DEFAULT_EVENT_LOCATION: &str = "Main Hall";

const HOST_ROLES: [UserRole; 2] = [UserRole::InstitutionAdmin, UserRole::Teacher];

pub type EventRepository = JsonRepository<Vec<SchoolEvent>>;

/// The "schedule event" form. Blank optional fields take the defaults above.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub category: EventCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("only institution admins and teachers can schedule events")]
    NotHost,
    #[error("an event needs a title")]
    MissingTitle,
    #[error("no event with id {0}")]
    UnknownEvent(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for EventError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotHost => "E_EVENT_HOST_ONLY",
            Self::MissingTitle => "E_EVENT_TITLE_REQUIRED",
            Self::UnknownEvent(_) => "E_EVENT_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

#[must_use]
pub fn can_host(role: UserRole) -> bool {
    HOST_ROLES.contains(&role)
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn list(repo: &EventRepository) -> Result<Vec<SchoolEvent>, EventError> {
    Ok(repo.load().await?)
}

/// Events scheduled on `date` (`YYYY-MM-DD`), in calendar order.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn events_on(repo: &EventRepository, date: &str) -> Result<Vec<SchoolEvent>, EventError> {
    let mut events: Vec<SchoolEvent> = list(repo).await?.into_iter().filter(|e| e.date == date).collect();
    events.sort_by(|a, b| a.time.cmp(&b.time));
    Ok(events)
}

/// Schedule an event hosted by `host` and publish "🗓️ New Event Scheduled".
///
/// # Errors
///
/// Returns [`EventError::NotHost`] for roles that cannot host,
/// [`EventError::MissingTitle`] for a blank title, or a store error.
pub async fn create(
    repo: &EventRepository,
    bus: &EventBus,
    host: &UserProfile,
    new: NewEvent,
) -> Result<SchoolEvent, EventError> {
    if !can_host(host.role) {
        return Err(EventError::NotHost);
    }
    let title = new.title.trim();
    if title.is_empty() {
        return Err(EventError::MissingTitle);
    }
    let event = SchoolEvent {
        id: Uuid::new_v4().to_string(),
        title: title.to_owned(),
        date: or_default(new.date, DEFAULT_EVENT_DATE),
        time: or_default(new.time, DEFAULT_EVENT_TIME),
        location: or_default(new.location, DEFAULT_EVENT_LOCATION),
        description: new.description,
        category: new.category,
        rsvps: Vec::new(),
    };

    let created = event.clone();
    repo.update(|events| {
        events.push(created);
        Ok::<_, EventError>(())
    })
    .await?;

    info!(event_id = %event.id, host = %host.id, "event scheduled");
    bus.emit("🗓️ New Event Scheduled", format!("{} at {}", event.title, event.location), Severity::Success);
    Ok(event)
}

/// Add or withdraw `user_id`'s RSVP. Returns the updated event.
///
/// # Errors
///
/// Returns [`EventError::UnknownEvent`] or a store error.
pub async fn toggle_rsvp(
    repo: &EventRepository,
    bus: &EventBus,
    user_id: &str,
    event_id: &str,
) -> Result<SchoolEvent, EventError> {
    let (event, attending) = repo
        .update(|events| {
            let event = events
                .iter_mut()
                .find(|e| e.id == event_id)
                .ok_or_else(|| EventError::UnknownEvent(event_id.to_owned()))?;
            let attending = if let Some(pos) = event.rsvps.iter().position(|id| id == user_id) {
                event.rsvps.remove(pos);
                false
            } else {
                event.rsvps.push(user_id.to_owned());
                true
            };
            Ok::<_, EventError>((event.clone(), attending))
        })
        .await?;

    if attending {
        bus.emit("✅ RSVP Confirmed", format!("You are now attending {}.", event.title), Severity::Success);
    }
    Ok(event)
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
