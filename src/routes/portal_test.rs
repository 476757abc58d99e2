use std::sync::Arc;

use super::*;
use crate::llm::LlmChat;
use crate::models::{Severity, UserRole};
use crate::services::assistant::Tone;
use crate::state::test_helpers::{MockLlm, settled_toasts, test_app_state, test_app_state_with_llm};

fn auth(role: UserRole) -> AuthProfile {
    let mut profile = UserProfile::basic(format!("u_{}", role.as_str()), "Tester", "t@sandton.edu", role);
    profile.phone = "011 456 7890".into();
    AuthProfile { profile, key: "k".into() }
}

// =============================================================================
// gate
// =============================================================================

#[tokio::test]
async fn restricted_features_reject_unlisted_roles() {
    let state = test_app_state();

    let err = get_register(State(state.clone()), auth(UserRole::Student)).await.unwrap_err();
    assert_eq!((err.status, err.code), (StatusCode::FORBIDDEN, "E_FORBIDDEN"));

    let err = search_users(State(state.clone()), auth(UserRole::Teacher), Query(SearchQuery::default()))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);

    let err = list_pricing(auth(UserRole::Parent)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);

    let broadcast = Broadcast { topic: "Exams".into(), tone: Tone::Urgent };
    let err = publish_announcement(State(state.clone()), auth(UserRole::Student), Json(broadcast)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);

    assert!(settled_toasts(&state).await.is_empty());
}

// =============================================================================
// events
// =============================================================================

#[tokio::test]
async fn teachers_host_and_students_rsvp() {
    let state = test_app_state();
    let new = NewEvent { title: "Open Day".into(), ..NewEvent::default() };
    let (status, Json(event)) = create_event(State(state.clone()), auth(UserRole::Teacher), Json(new)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let new = NewEvent { title: "Party".into(), ..NewEvent::default() };
    let err = create_event(State(state.clone()), auth(UserRole::Student), Json(new)).await.unwrap_err();
    assert_eq!((err.status, err.code), (StatusCode::FORBIDDEN, "E_EVENT_HOST_ONLY"));

    let Json(joined) = toggle_rsvp(State(state.clone()), auth(UserRole::Student), Path(event.id.clone())).await.unwrap();
    assert_eq!(joined.rsvps, vec!["u_student"]);

    let err = toggle_rsvp(State(state.clone()), auth(UserRole::Student), Path("missing".into())).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);

    let Json(on_day) = list_events(
        State(state.clone()),
        auth(UserRole::Parent),
        Query(EventQuery { date: Some("2025-08-01".into()) }),
    )
    .await
    .unwrap();
    assert_eq!(on_day.len(), 1);

    let titles: Vec<String> = settled_toasts(&state).await.into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["✅ RSVP Confirmed", "🗓️ New Event Scheduled"]);
}

#[tokio::test]
async fn describe_event_uses_assistant_for_hosts() {
    let mock = Arc::new(MockLlm::text("Join us for Heritage Day!"));
    let state = test_app_state_with_llm(mock as Arc<dyn LlmChat>);
    let req = DescribeRequest { title: "Heritage Day".into(), category: EventCategory::Cultural };
    let Json(resp) = describe_event(State(state.clone()), auth(UserRole::InstitutionAdmin), Json(req)).await.unwrap();
    assert_eq!(resp.text, "Join us for Heritage Day!");

    let req = DescribeRequest { title: "Heritage Day".into(), category: EventCategory::Cultural };
    assert!(describe_event(State(state), auth(UserRole::Parent), Json(req)).await.is_err());
}

// =============================================================================
// messaging
// =============================================================================

#[tokio::test]
async fn send_message_and_suggest() {
    let state = test_app_state();
    let req = SendRequest { text: "Bus leaves at 7".into() };
    let (status, Json(message)) =
        send_message(State(state.clone()), auth(UserRole::Parent), Path("1".into()), Json(req)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message.sender_id, "u_parent");

    let req = SendRequest { text: "   ".into() };
    let err = send_message(State(state.clone()), auth(UserRole::Parent), Path("1".into()), Json(req)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);

    let Json(replies) = suggest_replies(State(state.clone()), auth(UserRole::Teacher), Path("1".into())).await.unwrap();
    assert_eq!(replies.len(), 3);

    let Json(conversations) = list_conversations(State(state), auth(UserRole::Student)).await.unwrap();
    assert_eq!(conversations[0].last_message, "Bus leaves at 7");
}

// =============================================================================
// attendance
// =============================================================================

#[tokio::test]
async fn register_flow_for_teacher() {
    let state = test_app_state();
    let teacher = || auth(UserRole::Teacher);

    let err = finalize_register(State(state.clone()), teacher()).await.unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);

    let req = MarkRequest { status: AttendanceStatus::Late };
    let Json(register) = mark_student(State(state.clone()), teacher(), Path("4".into()), Json(req)).await.unwrap();
    assert_eq!(register.len(), 1);

    let req = MarkRequest { status: AttendanceStatus::Late };
    let err = mark_student(State(state.clone()), teacher(), Path("77".into()), Json(req)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);

    let Json(view) = get_register(State(state.clone()), teacher()).await.unwrap();
    assert_eq!(view.module, "CS101");
    assert_eq!(view.roster.len(), 5);

    let Json(done) = finalize_register(State(state.clone()), teacher()).await.unwrap();
    assert_eq!(done.marked, 1);

    let Json(insights) = analyze_register(State(state.clone()), teacher()).await.unwrap();
    assert!(insights.is_none());

    let toasts = settled_toasts(&state).await;
    assert_eq!(toasts[0].title, "Engagement Analysis Complete");
    assert_eq!(toasts[1].title, "Lecture Register Finalized");
}

// =============================================================================
// directory
// =============================================================================

#[tokio::test]
async fn admin_enrolls_and_exports() {
    let state = test_app_state();
    let admin = || auth(UserRole::InstitutionAdmin);

    let new = NewMember { name: "Ayanda".into(), email: "ayanda@sandton.edu".into(), role: UserRole::Student };
    let (status, Json(member)) = add_user(State(state.clone()), admin(), Json(new)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let Json(found) =
        search_users(State(state.clone()), admin(), Query(SearchQuery { q: "AYANDA".into() })).await.unwrap();
    assert_eq!(found, vec![member]);

    let response = export_users(State(state.clone()), admin()).await.unwrap();
    assert_eq!(response.headers()[CONTENT_TYPE], "application/x-ndjson; charset=utf-8");

    let new = NewMember { name: String::new(), email: "x@y.z".into(), role: UserRole::Parent };
    let err = add_user(State(state), admin(), Json(new)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn member_actions_are_acknowledged_for_directory_managers() {
    let state = test_app_state();
    let req = || MemberActionRequest { action: MemberAction::Permissions };

    let (status, Json(member)) =
        member_action(State(state.clone()), auth(UserRole::SuperAdmin), Path("1".into()), Json(req())).await.unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(member.name, "Themba Khumalo");

    let err = member_action(State(state.clone()), auth(UserRole::InstitutionAdmin), Path("99".into()), Json(req()))
        .await
        .unwrap_err();
    assert_eq!((err.status, err.code), (StatusCode::NOT_FOUND, "E_MEMBER_NOT_FOUND"));

    let err = member_action(State(state.clone()), auth(UserRole::Teacher), Path("1".into()), Json(req()))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::FORBIDDEN);

    let toasts = settled_toasts(&state).await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Member Permissions");
    assert_eq!(toasts[0].message, "Action processed for Themba Khumalo.");
}

#[tokio::test]
async fn report_export_is_for_institution_admins() {
    let state = test_app_state();
    assert_eq!(export_report(State(state.clone()), auth(UserRole::InstitutionAdmin)).await.unwrap(), StatusCode::ACCEPTED);

    let err = export_report(State(state.clone()), auth(UserRole::SuperAdmin)).await.unwrap_err();
    assert_eq!((err.status, err.code), (StatusCode::FORBIDDEN, "E_REPORT_ADMIN_ONLY"));

    let titles: Vec<String> = settled_toasts(&state).await.into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Export Started"]);
}

// =============================================================================
// announcements & catalog
// =============================================================================

#[tokio::test]
async fn urgent_broadcast_raises_alert_toast() {
    let state = test_app_state();
    let broadcast = Broadcast { topic: "Water outage on Main Campus".into(), tone: Tone::Urgent };
    let (status, Json(body)) =
        publish_announcement(State(state.clone()), auth(UserRole::Teacher), Json(broadcast)).await.unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body.severity, Severity::Alert);

    let toasts = settled_toasts(&state).await;
    assert_eq!(toasts[0].title, "⚠️ Urgent Announcement");

    let broadcast = Broadcast { topic: String::new(), tone: Tone::Friendly };
    let err = draft_announcement(State(state), auth(UserRole::SuperAdmin), Json(broadcast)).await.unwrap_err();
    assert_eq!(err.code, "E_TOPIC_REQUIRED");
}

#[tokio::test]
async fn catalog_actions_for_admins() {
    let state = test_app_state();
    let admin = || auth(UserRole::SuperAdmin);

    let Json(institutions) = list_institutions(admin()).await.unwrap();
    assert_eq!(institutions.len(), 4);
    consolidate_billing(State(state.clone()), admin()).await.unwrap();
    select_plan(State(state.clone()), admin(), Json(PlanRequest { tier: "starter".into() })).await.unwrap();
    let err = select_plan(State(state.clone()), admin(), Json(PlanRequest { tier: "Gold".into() })).await.unwrap_err();
    assert_eq!((err.status, err.code), (StatusCode::BAD_REQUEST, "E_UNKNOWN_TIER"));

    let req = SlotRequest { day: "Monday".into(), time: "09:00".into() };
    let Json(slot) = open_slot(State(state.clone()), auth(UserRole::Student), Json(req)).await.unwrap();
    assert_eq!(slot.subject, "Life Sciences");
    let req = SlotRequest { day: "Sunday".into(), time: "09:00".into() };
    assert_eq!(open_slot(State(state.clone()), admin(), Json(req)).await.unwrap_err().status, StatusCode::NOT_FOUND);

    let titles: Vec<String> = settled_toasts(&state).await.into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Life Sciences", "Subscription Update", "Billing Update"]);
}
