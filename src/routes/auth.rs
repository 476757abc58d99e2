//! Auth routes — mock login/signup, session cookie, profile settings.

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::error::{ApiError, ErrorCode};
use crate::models::UserProfile;
use crate::seed;
use crate::services::auth::{self as auth_svc, AuthError, LoginRequest, ProfileUpdate, Session, SignupRequest};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "portal_session";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Signed-in profile resolved from the session cookie. Use as a handler
/// parameter to require a session.
pub struct AuthProfile {
    pub profile: UserProfile,
    pub key: String,
}

impl<S> FromRequestParts<S> for AuthProfile
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let key = jar.get(SESSION_COOKIE).map(Cookie::value).unwrap_or_default();
        if key.is_empty() {
            return Err(auth_error(AuthError::NotSignedIn));
        }

        let app_state = AppState::from_ref(state);
        let profile = auth_svc::current(&app_state.repos.sessions, key)
            .await
            .map_err(auth_error)?
            .ok_or_else(|| auth_error(AuthError::NotSignedIn))?;
        Ok(Self { profile, key: key.to_owned() })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub(crate) fn auth_error(err: AuthError) -> ApiError {
    let status = match &err {
        e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::NotSignedIn => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::new(status, &err)
}

fn session_cookie(key: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn cleared_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

fn signed_in(state: &AppState, jar: CookieJar, session: Session) -> (CookieJar, Json<UserProfile>) {
    (jar.add(session_cookie(session.key, state.cookie_secure)), Json(session.profile))
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/login` — always succeeds.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserProfile>), ApiError> {
    let session = auth_svc::login(&state.repos.sessions, &req).await.map_err(auth_error)?;
    Ok(signed_in(&state, jar, session))
}

/// `POST /api/auth/signup` — 422 with the user-facing message when the
/// registry check fails.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<(CookieJar, Json<UserProfile>), ApiError> {
    let session = auth_svc::signup(&state.repos.sessions, &state.bus, &req)
        .await
        .map_err(|e| {
            if e.is_validation() {
                tracing::info!(code = e.error_code(), role = %req.role, "signup rejected");
            }
            auth_error(e)
        })?;
    Ok(signed_in(&state, jar, session))
}

/// `GET /api/auth/faculties` — choices for the lecturer signup track.
pub async fn faculties() -> Json<&'static [&'static str]> {
    Json(&seed::FACULTIES)
}

/// `POST /api/auth/logout` — drop the session (if any) and clear the cookie.
/// The cookie is cleared even when the stored session cannot be removed.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(key) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) {
        if let Err(e) = auth_svc::logout(&state.repos.sessions, &key).await {
            tracing::warn!(error = %e, code = e.error_code(), "logout: stored session not removed");
        }
    }
    (jar.add(cleared_cookie(state.cookie_secure)), StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me`
pub async fn me(auth: AuthProfile) -> Json<UserProfile> {
    Json(auth.profile)
}

/// `PATCH /api/auth/me` — settings form.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthProfile,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = auth_svc::update_profile(&state.repos.sessions, &state.bus, &auth.key, update)
        .await
        .map_err(auth_error)?;
    Ok(Json(profile))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
