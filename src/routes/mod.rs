//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds every HTTP and WebSocket endpoint under `/api` on one Axum router,
//! plus `/healthz`. Layers, outermost first: panic recovery, request
//! tracing, CORS. A panicking handler yields a generic 500 recovery body;
//! no state is salvaged.

pub mod auth;
pub mod notifications;
pub mod portal;
pub mod views;

use std::any::Any;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

const RECOVERY_MESSAGE: &str = "Oops! Something went wrong. We encountered an unexpected error. \
                                Don't worry, your data is safe. Please reload the portal.";

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/faculties", get(auth::faculties))
        .route("/api/auth/me", get(auth::me).patch(auth::update_me))
        .route("/api/nav", get(views::nav))
        .route("/api/views/{tab}", get(views::view))
        .route("/api/dashboard", get(portal::overview))
        .route("/api/dashboard/export", post(portal::export_report))
        .route("/api/notifications", get(notifications::list).post(notifications::publish))
        .route("/api/notifications/{id}", delete(notifications::dismiss))
        .route("/api/ws", get(notifications::stream))
        .route("/api/events", get(portal::list_events).post(portal::create_event))
        .route("/api/events/describe", post(portal::describe_event))
        .route("/api/events/{id}/rsvp", post(portal::toggle_rsvp))
        .route("/api/conversations", get(portal::list_conversations))
        .route("/api/conversations/{id}/messages", post(portal::send_message))
        .route("/api/conversations/{id}/suggestions", post(portal::suggest_replies))
        .route("/api/attendance", get(portal::get_register))
        .route("/api/attendance/finalize", post(portal::finalize_register))
        .route("/api/attendance/analyze", post(portal::analyze_register))
        .route("/api/attendance/{student_id}", put(portal::mark_student))
        .route("/api/users", get(portal::search_users).post(portal::add_user))
        .route("/api/users/export.jsonl", get(portal::export_users))
        .route("/api/users/{id}/actions", post(portal::member_action))
        .route("/api/announcements", post(portal::publish_announcement))
        .route("/api/announcements/draft", post(portal::draft_announcement))
        .route("/api/institutions", get(portal::list_institutions))
        .route("/api/institutions/consolidate-billing", post(portal::consolidate_billing))
        .route("/api/pricing", get(portal::list_pricing))
        .route("/api/pricing/select", post(portal::select_plan))
        .route("/api/pricing/demo", post(portal::request_demo))
        .route("/api/timetable", get(portal::list_timetable))
        .route("/api/timetable/export", post(portal::export_timetable))
        .route("/api/timetable/slot", post(portal::open_slot))
        .route("/api/support", post(portal::open_support))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(recover_from_panic))
        .with_state(state)
}

fn recover_from_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "handler panicked");
    ApiError::plain(StatusCode::INTERNAL_SERVER_ERROR, "E_INTERNAL", RECOVERY_MESSAGE).into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
