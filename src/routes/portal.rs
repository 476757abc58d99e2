//! Feature routes — events, messaging, attendance, directory, broadcasts,
//! catalog and dashboard.
//!
//! DESIGN
//! ======
//! Every handler that touches a restricted feature calls
//! [`access::authorize`] with the feature's tab before doing anything else.
//! Unrestricted features (events, messaging, timetable) rely on the session
//! alone, plus the feature's own rules (only hosts schedule events).
//! Service errors are mapped to status codes here and nowhere else.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use super::auth::AuthProfile;
use crate::access::{self, AccessError, Tab};
use crate::error::ApiError;
use crate::models::{
    AttendanceStatus, Conversation, EventCategory, Institution, Message, PricingTier, Register, RosterStudent,
    SchoolEvent, SubscriptionTier, TimetableSlot, UserProfile,
};
use crate::seed::ROSTER_MODULE;
use crate::services::announcements::{self, AnnouncementError, Broadcast};
use crate::services::assistant::AttendanceInsights;
use crate::services::attendance::{self, AttendanceError};
use crate::services::catalog::{self, ExportTarget, TimetableGrid};
use crate::services::dashboard::{self, Overview};
use crate::services::directory::{self, DirectoryError, MemberAction, NewMember};
use crate::services::events::{self, EventError, NewEvent};
use crate::services::messaging::{self, MessagingError};
use crate::services::notify::Notice;
use crate::state::AppState;

// =============================================================================
// ERROR MAPPING
// =============================================================================

fn gate(tab: Tab, auth: &AuthProfile) -> Result<(), ApiError> {
    access::authorize(tab, auth.profile.role).map_err(|e: AccessError| ApiError::new(StatusCode::FORBIDDEN, &e))
}

pub(crate) fn event_error(err: EventError) -> ApiError {
    let status = match err {
        EventError::NotHost => StatusCode::FORBIDDEN,
        EventError::MissingTitle => StatusCode::BAD_REQUEST,
        EventError::UnknownEvent(_) => StatusCode::NOT_FOUND,
        EventError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::new(status, &err)
}

pub(crate) fn messaging_error(err: MessagingError) -> ApiError {
    let status = match err {
        MessagingError::EmptyMessage => StatusCode::BAD_REQUEST,
        MessagingError::UnknownConversation(_) => StatusCode::NOT_FOUND,
        MessagingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::new(status, &err)
}

pub(crate) fn attendance_error(err: AttendanceError) -> ApiError {
    let status = match err {
        AttendanceError::UnknownStudent(_) => StatusCode::NOT_FOUND,
        AttendanceError::EmptyRegister => StatusCode::CONFLICT,
        AttendanceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::new(status, &err)
}

pub(crate) fn directory_error(err: DirectoryError) -> ApiError {
    let status = match err {
        DirectoryError::MissingField => StatusCode::BAD_REQUEST,
        DirectoryError::UnknownMember(_) => StatusCode::NOT_FOUND,
        DirectoryError::Export(_) | DirectoryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::new(status, &err)
}

fn announcement_error(err: AnnouncementError) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, &err)
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// `GET /api/dashboard`
pub async fn overview(auth: AuthProfile) -> Json<Overview> {
    Json(dashboard::overview(&auth.profile))
}

/// `POST /api/dashboard/export` — institution admins only.
pub async fn export_report(State(state): State<AppState>, auth: AuthProfile) -> Result<StatusCode, ApiError> {
    dashboard::export_report(&state.bus, auth.profile.role).map_err(|e| ApiError::new(StatusCode::FORBIDDEN, &e))?;
    Ok(StatusCode::ACCEPTED)
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    pub date: Option<String>,
}

/// `GET /api/events[?date=YYYY-MM-DD]`
pub async fn list_events(
    State(state): State<AppState>,
    _auth: AuthProfile,
    Query(query): Query<EventQuery>,
) -> Result<Json<Vec<SchoolEvent>>, ApiError> {
    let events = match query.date {
        Some(date) => events::events_on(&state.repos.events, &date).await,
        None => events::list(&state.repos.events).await,
    }
    .map_err(event_error)?;
    Ok(Json(events))
}

/// `POST /api/events`
pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(new): Json<NewEvent>,
) -> Result<(StatusCode, Json<SchoolEvent>), ApiError> {
    gate(Tab::Events, &auth)?;
    let event = events::create(&state.repos.events, &state.bus, &auth.profile, new)
        .await
        .map_err(event_error)?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `POST /api/events/{id}/rsvp` — toggles.
pub async fn toggle_rsvp(
    State(state): State<AppState>,
    auth: AuthProfile,
    Path(event_id): Path<String>,
) -> Result<Json<SchoolEvent>, ApiError> {
    gate(Tab::Events, &auth)?;
    let event = events::toggle_rsvp(&state.repos.events, &state.bus, &auth.profile.id, &event_id)
        .await
        .map_err(event_error)?;
    Ok(Json(event))
}

#[derive(Debug, Deserialize)]
pub struct DescribeRequest {
    pub title: String,
    #[serde(default)]
    pub category: EventCategory,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextResponse {
    pub text: String,
}

/// `POST /api/events/describe` — assistant draft for the host's form.
pub async fn describe_event(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(req): Json<DescribeRequest>,
) -> Result<Json<TextResponse>, ApiError> {
    if !events::can_host(auth.profile.role) {
        return Err(event_error(EventError::NotHost));
    }
    if req.title.trim().is_empty() {
        return Err(event_error(EventError::MissingTitle));
    }
    let text = state
        .assistant
        .event_description(&auth.profile.id, req.title.trim(), req.category)
        .await;
    Ok(Json(TextResponse { text }))
}

// =============================================================================
// MESSAGING
// =============================================================================

/// `GET /api/conversations`
pub async fn list_conversations(
    State(state): State<AppState>,
    _auth: AuthProfile,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let conversations = messaging::list(&state.repos.conversations).await.map_err(messaging_error)?;
    Ok(Json(conversations))
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub text: String,
}

/// `POST /api/conversations/{id}/messages`
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthProfile,
    Path(conversation_id): Path<String>,
    Json(req): Json<SendRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    gate(Tab::Messaging, &auth)?;
    let message = messaging::send(&state.repos.conversations, &conversation_id, &auth.profile.id, &req.text)
        .await
        .map_err(messaging_error)?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// `POST /api/conversations/{id}/suggestions`
pub async fn suggest_replies(
    State(state): State<AppState>,
    auth: AuthProfile,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    gate(Tab::Messaging, &auth)?;
    let replies = messaging::suggestions(&state.repos.conversations, &state.assistant, &auth.profile.id, &conversation_id)
        .await
        .map_err(messaging_error)?;
    Ok(Json(replies))
}

// =============================================================================
// ATTENDANCE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct RegisterView {
    pub module: &'static str,
    pub roster: Vec<RosterStudent>,
    pub register: Register,
}

/// `GET /api/attendance`
pub async fn get_register(State(state): State<AppState>, auth: AuthProfile) -> Result<Json<RegisterView>, ApiError> {
    gate(Tab::Attendance, &auth)?;
    let register = attendance::register(&state.repos.attendance).await.map_err(attendance_error)?;
    Ok(Json(RegisterView { module: ROSTER_MODULE, roster: attendance::roster(), register }))
}

#[derive(Debug, Deserialize)]
pub struct MarkRequest {
    pub status: AttendanceStatus,
}

/// `PUT /api/attendance/{student_id}`
pub async fn mark_student(
    State(state): State<AppState>,
    auth: AuthProfile,
    Path(student_id): Path<String>,
    Json(req): Json<MarkRequest>,
) -> Result<Json<Register>, ApiError> {
    gate(Tab::Attendance, &auth)?;
    let register = attendance::mark(&state.repos.attendance, &student_id, req.status)
        .await
        .map_err(attendance_error)?;
    Ok(Json(register))
}

#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub marked: usize,
}

/// `POST /api/attendance/finalize`
pub async fn finalize_register(
    State(state): State<AppState>,
    auth: AuthProfile,
) -> Result<Json<FinalizeResponse>, ApiError> {
    gate(Tab::Attendance, &auth)?;
    let marked = attendance::finalize(&state.repos.attendance, &state.bus)
        .await
        .map_err(attendance_error)?;
    Ok(Json(FinalizeResponse { marked }))
}

/// `POST /api/attendance/analyze` — `null` when the assistant had nothing.
pub async fn analyze_register(
    State(state): State<AppState>,
    auth: AuthProfile,
) -> Result<Json<Option<AttendanceInsights>>, ApiError> {
    gate(Tab::Attendance, &auth)?;
    let insights = attendance::analyze(&state.repos.attendance, &state.assistant, &state.bus, &auth.profile.id)
        .await
        .map_err(attendance_error)?;
    Ok(Json(insights))
}

// =============================================================================
// DIRECTORY
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// `GET /api/users[?q=...]`
pub async fn search_users(
    State(state): State<AppState>,
    auth: AuthProfile,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    gate(Tab::Users, &auth)?;
    let members = directory::search(&state.repos.directory, &query.q).await.map_err(directory_error)?;
    Ok(Json(members))
}

/// `POST /api/users`
pub async fn add_user(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(new): Json<NewMember>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    gate(Tab::Users, &auth)?;
    let member = directory::add(&state.repos.directory, &state.bus, new)
        .await
        .map_err(directory_error)?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[derive(Debug, Deserialize)]
pub struct MemberActionRequest {
    pub action: MemberAction,
}

/// `POST /api/users/{id}/actions` — edit/permissions/delete acknowledgement.
pub async fn member_action(
    State(state): State<AppState>,
    auth: AuthProfile,
    Path(member_id): Path<String>,
    Json(req): Json<MemberActionRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    gate(Tab::Users, &auth)?;
    let member = directory::member_action(&state.repos.directory, &state.bus, &member_id, req.action)
        .await
        .map_err(directory_error)?;
    Ok((StatusCode::ACCEPTED, Json(member)))
}

/// `GET /api/users/export.jsonl`
pub async fn export_users(State(state): State<AppState>, auth: AuthProfile) -> Result<Response, ApiError> {
    gate(Tab::Users, &auth)?;
    let body = directory::export_jsonl(&state.repos.directory, &state.bus)
        .await
        .map_err(directory_error)?;
    Ok((
        [
            (CONTENT_TYPE, "application/x-ndjson; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"directory.jsonl\""),
        ],
        body,
    )
        .into_response())
}

// =============================================================================
// ANNOUNCEMENTS
// =============================================================================

/// `POST /api/announcements/draft`
pub async fn draft_announcement(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(broadcast): Json<Broadcast>,
) -> Result<Json<TextResponse>, ApiError> {
    gate(Tab::Announcements, &auth)?;
    let text = announcements::draft(&state.assistant, &auth.profile.id, &broadcast)
        .await
        .map_err(announcement_error)?;
    Ok(Json(TextResponse { text }))
}

/// `POST /api/announcements` — broadcast to every session.
pub async fn publish_announcement(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(broadcast): Json<Broadcast>,
) -> Result<(StatusCode, Json<super::notifications::NoticeBody>), ApiError> {
    gate(Tab::Announcements, &auth)?;
    let notice: Notice = announcements::publish(&state.bus, &broadcast).map_err(announcement_error)?;
    Ok((StatusCode::ACCEPTED, Json(notice.into())))
}

// =============================================================================
// CATALOG
// =============================================================================

/// `GET /api/institutions`
pub async fn list_institutions(auth: AuthProfile) -> Result<Json<Vec<Institution>>, ApiError> {
    gate(Tab::Institutions, &auth)?;
    Ok(Json(catalog::institutions()))
}

/// `POST /api/institutions/consolidate-billing`
pub async fn consolidate_billing(State(state): State<AppState>, auth: AuthProfile) -> Result<StatusCode, ApiError> {
    gate(Tab::Institutions, &auth)?;
    catalog::consolidate_billing(&state.bus);
    Ok(StatusCode::ACCEPTED)
}

/// `GET /api/pricing`
pub async fn list_pricing(auth: AuthProfile) -> Result<Json<Vec<PricingTier>>, ApiError> {
    gate(Tab::Pricing, &auth)?;
    Ok(Json(catalog::pricing()))
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub tier: String,
}

/// `POST /api/pricing/select`
pub async fn select_plan(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(req): Json<PlanRequest>,
) -> Result<StatusCode, ApiError> {
    gate(Tab::Pricing, &auth)?;
    let tier = SubscriptionTier::parse(req.tier.trim()).ok_or_else(|| {
        ApiError::plain(StatusCode::BAD_REQUEST, "E_UNKNOWN_TIER", format!("no {} plan on offer", req.tier.trim()))
    })?;
    catalog::select_plan(&state.bus, tier);
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
pub struct DemoRequest {
    pub kind: String,
}

/// `POST /api/pricing/demo`
pub async fn request_demo(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(req): Json<DemoRequest>,
) -> Result<StatusCode, ApiError> {
    gate(Tab::Pricing, &auth)?;
    catalog::request_demo(&state.bus, req.kind.trim());
    Ok(StatusCode::ACCEPTED)
}

/// `GET /api/timetable`
pub async fn list_timetable(_auth: AuthProfile) -> Json<TimetableGrid> {
    Json(catalog::timetable_grid())
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub target: ExportTarget,
}

/// `POST /api/timetable/export`
pub async fn export_timetable(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(req): Json<ExportRequest>,
) -> Result<StatusCode, ApiError> {
    gate(Tab::Timetable, &auth)?;
    catalog::export_timetable(&state.bus, req.target);
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
pub struct SlotRequest {
    pub day: String,
    pub time: String,
}

/// `POST /api/timetable/slot` — announce who leads the lecture in a slot.
pub async fn open_slot(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(req): Json<SlotRequest>,
) -> Result<Json<TimetableSlot>, ApiError> {
    gate(Tab::Timetable, &auth)?;
    catalog::open_slot(&state.bus, &req.day, &req.time).map(Json).ok_or_else(|| {
        ApiError::plain(StatusCode::NOT_FOUND, "E_SLOT_EMPTY", format!("no lecture on {} at {}", req.day, req.time))
    })
}

/// `POST /api/support`
pub async fn open_support(State(state): State<AppState>, _auth: AuthProfile) -> StatusCode {
    catalog::open_support(&state.bus);
    StatusCode::ACCEPTED
}

#[cfg(test)]
#[path = "portal_test.rs"]
mod tests;
