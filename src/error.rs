//! Error codes and the JSON error response.
//!
//! DESIGN
//! ======
//! Each service owns a `thiserror` enum and implements [`ErrorCode`] to
//! expose a grepable code and a retryable flag. Routes pick the HTTP status
//! and wrap the error in [`ApiError`], which renders as
//! `{"code": ..., "message": ..., "retryable": ...}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Grepable error code and retryable flag for structured error bodies.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// An error ready to leave the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, err: &impl ErrorCode) -> Self {
        Self { status, code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }

    /// Error not tied to a service enum (e.g. missing session).
    #[must_use]
    pub fn plain(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), retryable: false }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "request failed");
        }
        (self.status, Json(self)).into_response()
    }
}
