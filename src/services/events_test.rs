use std::sync::Arc;

use super::*;
use crate::store::{EVENTS_KEY, MemoryStore};

fn repo() -> EventRepository {
    JsonRepository::new(Arc::new(MemoryStore::new()), EVENTS_KEY, crate::seed::default_events)
}

fn user(role: UserRole) -> UserProfile {
    UserProfile::basic("u_host", "Host", "host@sandton.edu", role)
}

// =============================================================================
// list / events_on
// =============================================================================

#[tokio::test]
async fn list_starts_from_seed() {
    let events = list(&repo()).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].title, "Grade 10 Parent Meeting");
}

#[tokio::test]
async fn events_on_filters_and_orders_by_time() {
    let repo = repo();
    let bus = EventBus::new(8);
    let host = user(UserRole::Teacher);
    for (title, time) in [("Late", "15:00"), ("Early", "07:30")] {
        let new = NewEvent {
            title: title.into(),
            date: Some("2025-08-20".into()),
            time: Some(time.into()),
            ..NewEvent::default()
        };
        create(&repo, &bus, &host, new).await.unwrap();
    }

    let titles: Vec<String> = events_on(&repo, "2025-08-20").await.unwrap().into_iter().map(|e| e.title).collect();
    assert_eq!(titles, vec!["Early", "Inter-House Athletics", "Late"]);
    assert!(events_on(&repo, "2030-01-01").await.unwrap().is_empty());
}

// =============================================================================
// create
// =============================================================================

#[tokio::test]
async fn create_applies_defaults_and_announces() {
    let repo = repo();
    let bus = EventBus::new(8);
    let mut rx = bus.receiver();

    let new = NewEvent { title: "  Science Fair ".into(), location: Some("  ".into()), ..NewEvent::default() };
    let event = create(&repo, &bus, &user(UserRole::InstitutionAdmin), new).await.unwrap();
    assert_eq!(event.title, "Science Fair");
    assert_eq!(event.date, DEFAULT_EVENT_DATE);
    assert_eq!(event.time, DEFAULT_EVENT_TIME);
    assert_eq!(event.location, DEFAULT_EVENT_LOCATION);
    assert_eq!(event.category, EventCategory::Academic);
    assert!(event.rsvps.is_empty());
    assert!(Uuid::parse_str(&event.id).is_ok());

    assert_eq!(list(&repo).await.unwrap().last(), Some(&event));
    let notice = rx.try_recv().unwrap();
    assert_eq!(notice.title, "🗓️ New Event Scheduled");
    assert_eq!(notice.message, "Science Fair at Main Hall");
    assert_eq!(notice.severity, Severity::Success);
}

#[tokio::test]
async fn create_rejects_non_hosts_and_blank_titles() {
    let repo = repo();
    let bus = EventBus::new(8);
    let mut rx = bus.receiver();

    for role in [UserRole::Student, UserRole::Parent, UserRole::SuperAdmin] {
        let new = NewEvent { title: "Party".into(), ..NewEvent::default() };
        let err = create(&repo, &bus, &user(role), new).await.unwrap_err();
        assert_eq!(err.error_code(), "E_EVENT_HOST_ONLY");
    }
    let err = create(&repo, &bus, &user(UserRole::Teacher), NewEvent::default()).await.unwrap_err();
    assert!(matches!(err, EventError::MissingTitle));

    assert_eq!(list(&repo).await.unwrap().len(), 2);
    assert!(rx.try_recv().is_err());
}

// =============================================================================
// toggle_rsvp
// =============================================================================

#[tokio::test]
async fn rsvp_toggles_and_only_confirms_when_joining() {
    let repo = repo();
    let bus = EventBus::new(8);
    let mut rx = bus.receiver();

    let joined = toggle_rsvp(&repo, &bus, "u_1", "2").await.unwrap();
    assert_eq!(joined.rsvps, vec!["u_1"]);
    let notice = rx.try_recv().unwrap();
    assert_eq!(notice.title, "✅ RSVP Confirmed");
    assert_eq!(notice.message, "You are now attending Inter-House Athletics.");

    let left = toggle_rsvp(&repo, &bus, "u_1", "2").await.unwrap();
    assert!(left.rsvps.is_empty());
    assert!(rx.try_recv().is_err());
    assert!(list(&repo).await.unwrap()[1].rsvps.is_empty());
}

#[tokio::test]
async fn rsvp_to_unknown_event_fails() {
    let bus = EventBus::new(8);
    let err = toggle_rsvp(&repo(), &bus, "u_1", "nope").await.unwrap_err();
    assert!(matches!(err, EventError::UnknownEvent(ref id) if id == "nope"));
    assert!(!err.retryable());
}
