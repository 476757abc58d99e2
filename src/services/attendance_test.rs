use std::sync::Arc;

use super::*;
use crate::llm::LlmChat;
use crate::rate_limit::RateLimiter;
use crate::seed::register_of;
use crate::state::test_helpers::MockLlm;
use crate::store::{ATTENDANCE_KEY, MemoryStore};

use crate::models::AttendanceStatus::{Absent, Late, Present};

fn repo() -> AttendanceRepository {
    JsonRepository::new(Arc::new(MemoryStore::new()), ATTENDANCE_KEY, seed::default_register)
}

#[test]
fn roster_is_cs101_group_a() {
    let students = roster();
    assert_eq!(students.len(), 5);
    assert!(students.iter().all(|s| s.context == "CS101 - Group A"));
}

#[test]
fn summary_counts_absent_and_late() {
    let register = register_of(&[("1", Absent), ("2", Late), ("3", Absent), ("4", Present)]);
    assert_eq!(
        summary(&register),
        "Module CS101 Attendance: 5 total students. 2 absent, 1 late. Note: Early morning lecture (08:00)."
    );
    assert!(summary(&Register::new()).contains("0 absent, 0 late"));
}

#[tokio::test]
async fn mark_updates_draft() {
    let repo = repo();
    mark(&repo, "1", Present).await.unwrap();
    let draft = mark(&repo, "1", Late).await.unwrap();
    assert_eq!(draft, register_of(&[("1", Late)]));
    assert_eq!(register(&repo).await.unwrap(), draft);
}

#[tokio::test]
async fn mark_rejects_students_off_roster() {
    let repo = repo();
    let err = mark(&repo, "99", Present).await.unwrap_err();
    assert_eq!(err.error_code(), "E_STUDENT_NOT_ON_ROSTER");
    assert!(register(&repo).await.unwrap().is_empty());
}

#[tokio::test]
async fn finalize_requires_marks_and_announces() {
    let repo = repo();
    let bus = EventBus::new(8);
    let mut rx = bus.receiver();

    assert!(matches!(finalize(&repo, &bus).await, Err(AttendanceError::EmptyRegister)));
    assert!(rx.try_recv().is_err());

    mark(&repo, "2", Absent).await.unwrap();
    assert_eq!(finalize(&repo, &bus).await.unwrap(), 1);
    let notice = rx.try_recv().unwrap();
    assert_eq!(notice.title, "Lecture Register Finalized");
    assert_eq!(notice.message, "Participation data for CS101 has been synced with Faculty records.");
    assert_eq!(notice.severity, Severity::Success);
    assert_eq!(register(&repo).await.unwrap().len(), 1);
}

#[tokio::test]
async fn analyze_sends_summary_and_announces() {
    let repo = repo();
    let bus = EventBus::new(8);
    let mut rx = bus.receiver();
    mark(&repo, "3", Absent).await.unwrap();

    let mock = Arc::new(MockLlm::text(r#"{"insights": ["One absence"], "recommendations": ["Follow up"]}"#));
    let assistant = Assistant::new(Some(mock.clone() as Arc<dyn LlmChat>), RateLimiter::default());
    let insights = analyze(&repo, &assistant, &bus, "u_t").await.unwrap().unwrap();
    assert_eq!(insights.insights, vec!["One absence"]);
    assert!(mock.requests()[0].messages[0].content.contains("1 absent, 0 late"));

    let notice = rx.try_recv().unwrap();
    assert_eq!(notice.title, "Engagement Analysis Complete");
    assert_eq!(notice.severity, Severity::Info);
}

#[tokio::test]
async fn analyze_still_announces_on_fallback() {
    let bus = EventBus::new(8);
    let mut rx = bus.receiver();
    let assistant = Assistant::new(None, RateLimiter::default());
    assert_eq!(analyze(&repo(), &assistant, &bus, "u_t").await.unwrap(), None);
    assert_eq!(rx.try_recv().unwrap().title, "Engagement Analysis Complete");
}
