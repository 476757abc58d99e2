//! Notification routes — toast list, dismissal, manual publish and the live
//! WebSocket stream.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade (session cookie required) → subscribe to the bus
//! 2. Every published notice → one JSON text frame
//! 3. Client close or send failure → drop the receiver

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::auth::AuthProfile;
use crate::error::ApiError;
use crate::models::{AppNotification, Severity};
use crate::services::notify::Notice;
use crate::state::AppState;

/// Body of a manual publish, and the frame shape pushed over the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeBody {
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub severity: Severity,
}

impl From<Notice> for NoticeBody {
    fn from(notice: Notice) -> Self {
        Self { title: notice.title, message: notice.message, severity: notice.severity }
    }
}

/// `GET /api/notifications` — live toasts, newest first.
pub async fn list(State(state): State<AppState>, _auth: AuthProfile) -> Json<Vec<AppNotification>> {
    Json(state.toasts.list())
}

/// `DELETE /api/notifications/{id}`
pub async fn dismiss(
    State(state): State<AppState>,
    _auth: AuthProfile,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.toasts.dismiss(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::plain(StatusCode::NOT_FOUND, "E_NOTIFICATION_NOT_FOUND", format!("no live notification {id}")))
    }
}

/// `POST /api/notifications` — publish an arbitrary notice.
pub async fn publish(
    State(state): State<AppState>,
    _auth: AuthProfile,
    Json(body): Json<NoticeBody>,
) -> Result<StatusCode, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::plain(StatusCode::BAD_REQUEST, "E_TITLE_REQUIRED", "a notification needs a title"));
    }
    state.bus.emit(body.title, body.message, body.severity);
    Ok(StatusCode::ACCEPTED)
}

/// `GET /api/ws`
pub async fn stream(State(state): State<AppState>, auth: AuthProfile, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_stream(socket, state, auth.profile.id))
}

async fn run_stream(socket: WebSocket, state: AppState, user_id: String) {
    let mut notices = state.bus.receiver();
    let (mut sink, mut inbound) = socket.split();
    info!(%user_id, "ws: notification stream opened");

    loop {
        tokio::select! {
            msg = inbound.next() => match msg {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            notice = notices.recv() => match notice {
                Ok(notice) => {
                    let Ok(text) = serde_json::to_string(&NoticeBody::from(notice)) else { continue };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(%user_id, skipped, "ws: stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    info!(%user_id, "ws: notification stream closed");
}
