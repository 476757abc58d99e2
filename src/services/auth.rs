//! Mock authentication — login, registry-checked signup, sessions.
//!
//! DESIGN
//! ======
//! There is no credential check. Login always succeeds and derives a
//! profile from the email. Signup validates student numbers and lecturer
//! ids against the static registries and merges the registry's fields into
//! the new profile. A session is nothing more than the profile stored under
//! a random key; the HTTP layer carries that key in a cookie.
//!
//! Profile construction is pure (`login_profile`, `signup_profile`); the
//! async wrappers add persistence and notifications.

use serde::Deserialize;
use tracing::info;

use super::notify::{EventBus, Notice};
use super::{generate_session_key, random_id};
use crate::error::ErrorCode;
use crate::models::{Severity, UserProfile, UserRole};
use crate::seed::{self, DEFAULT_INSTITUTION, DEFAULT_PHONE};
use crate::store::{SessionRepository, StoreError};

const USER_ID_PREFIX: &str = "u_";
const USER_ID_LEN: usize = 9;

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    /// Accepted and ignored.
    #[serde(default)]
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub institution_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub institution_id: Option<String>,
    #[serde(default)]
    pub student_number: Option<String>,
    #[serde(default)]
    pub lecturer_id: Option<String>,
    #[serde(default)]
    pub faculty: Option<String>,
}

/// Settings form: any field left out keeps its current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A freshly created session.
#[derive(Debug, Clone)]
pub struct Session {
    pub key: String,
    pub profile: UserProfile,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Please select your institution.")]
    MissingInstitution,
    #[error("Student ID not recognized under this institution.")]
    UnknownStudent,
    #[error("Lecturer ID or Faculty mismatch. Please check your staff portal credentials.")]
    LecturerMismatch,
    #[error("not signed in")]
    NotSignedIn,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Signup validation failures the user can correct and resubmit.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingInstitution | Self::UnknownStudent | Self::LecturerMismatch)
    }
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingInstitution => "E_INSTITUTION_REQUIRED",
            Self::UnknownStudent => "E_STUDENT_NOT_RECOGNIZED",
            Self::LecturerMismatch => "E_LECTURER_MISMATCH",
            Self::NotSignedIn => "E_NOT_SIGNED_IN",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

// =============================================================================
// PURE PROFILE CONSTRUCTION
// =============================================================================

fn new_user_id() -> String {
    format!("{USER_ID_PREFIX}{}", random_id(USER_ID_LEN))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn base_profile(name: String, email: &str, role: UserRole, institution_id: Option<&str>) -> UserProfile {
    let mut profile = UserProfile::basic(new_user_id(), name, email.trim(), role);
    profile.phone = DEFAULT_PHONE.to_owned();
    profile.institution_id = Some(non_blank(institution_id).unwrap_or(DEFAULT_INSTITUTION).to_owned());
    profile
}

/// Display name for an ad hoc login: the email's local part, or `"User"`.
#[must_use]
pub fn name_from_email(email: &str) -> String {
    email
        .trim()
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or("User")
        .to_owned()
}

/// Build the profile for a login. Never fails.
#[must_use]
pub fn login_profile(req: &LoginRequest) -> UserProfile {
    base_profile(name_from_email(&req.email), &req.email, req.role, req.institution_id.as_deref())
}

/// Validate a signup and build its profile, plus the notice announcing a
/// registry match (student and lecturer tracks only).
///
/// # Errors
///
/// Returns a validation error when the institution is missing or the
/// identifier does not match the registry.
pub fn signup_profile(req: &SignupRequest) -> Result<(UserProfile, Option<Notice>), AuthError> {
    let institution = non_blank(req.institution_id.as_deref()).ok_or(AuthError::MissingInstitution)?;
    let mut profile = base_profile(req.name.trim().to_owned(), &req.email, req.role, Some(institution));

    let notice = match req.role {
        UserRole::Student => {
            let number = req.student_number.as_deref().unwrap_or_default().trim().to_uppercase();
            let entry = seed::lookup_student(&number).ok_or(AuthError::UnknownStudent)?;
            merge_registry(&mut profile, entry);
            let message = format!("ID {number} recognized at {institution}. Campus: {}.", entry.campus);
            profile.student_number = Some(number);
            Some(Notice::new("Student ID Verified", message, Severity::Success))
        }
        UserRole::Teacher => {
            let id = req.lecturer_id.as_deref().unwrap_or_default().trim().to_uppercase();
            let entry = seed::lookup_lecturer(&id)
                .filter(|entry| entry.faculty == req.faculty.as_deref())
                .ok_or(AuthError::LecturerMismatch)?;
            merge_registry(&mut profile, entry);
            profile.lecturer_id = Some(id);
            let message = format!("Welcome Dr./Prof. {}. You are assigned to the {}.", profile.name, entry.campus);
            Some(Notice::new("Staff Record Synced", message, Severity::Success))
        }
        UserRole::SuperAdmin | UserRole::InstitutionAdmin | UserRole::Parent => None,
    };
    Ok((profile, notice))
}

fn merge_registry(profile: &mut UserProfile, entry: seed::RegistryEntry) {
    profile.name = entry.name.to_owned();
    profile.campus = Some(entry.campus.to_owned());
    if let Some(faculty) = entry.faculty {
        profile.faculty = Some(faculty.to_owned());
    }
    if let Some(course) = entry.course {
        profile.course = Some(course.to_owned());
    }
    if let Some(class_name) = entry.class_name {
        profile.class_name = Some(class_name.to_owned());
    }
    if !entry.teachers.is_empty() {
        profile.teachers = Some(entry.teachers.iter().map(|t| (*t).to_owned()).collect());
    }
}

/// Apply a settings update to `profile`.
pub fn apply_update(profile: &mut UserProfile, update: ProfileUpdate) {
    if let Some(name) = update.name {
        profile.name = name;
    }
    if let Some(email) = update.email {
        profile.email = email;
    }
    if let Some(phone) = update.phone {
        profile.phone = phone;
    }
}

// =============================================================================
// SESSION OPERATIONS
// =============================================================================

async fn open_session(sessions: &SessionRepository, profile: UserProfile) -> Result<Session, AuthError> {
    let key = generate_session_key();
    sessions.put(&key, &profile).await?;
    info!(user_id = %profile.id, role = %profile.role, "session opened");
    Ok(Session { key, profile })
}

/// # Errors
///
/// Returns an error only if the session cannot be stored.
pub async fn login(sessions: &SessionRepository, req: &LoginRequest) -> Result<Session, AuthError> {
    open_session(sessions, login_profile(req)).await
}

/// Validate, store the session and announce a registry match. Nothing is
/// stored or published when validation fails.
///
/// # Errors
///
/// Returns a validation error or a store error.
pub async fn signup(sessions: &SessionRepository, bus: &EventBus, req: &SignupRequest) -> Result<Session, AuthError> {
    let (profile, notice) = signup_profile(req)?;
    let session = open_session(sessions, profile).await?;
    if let Some(notice) = notice {
        bus.publish(notice);
    }
    Ok(session)
}

/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn current(sessions: &SessionRepository, key: &str) -> Result<Option<UserProfile>, AuthError> {
    Ok(sessions.get(key).await?)
}

/// # Errors
///
/// Returns an error if the session store delete fails.
pub async fn logout(sessions: &SessionRepository, key: &str) -> Result<(), AuthError> {
    sessions.remove(key).await?;
    Ok(())
}

/// Merge `update` into the signed-in profile, store it, and publish
/// "Profile Updated".
///
/// # Errors
///
/// Returns [`AuthError::NotSignedIn`] when the session is gone, or a store
/// error.
pub async fn update_profile(
    sessions: &SessionRepository,
    bus: &EventBus,
    key: &str,
    update: ProfileUpdate,
) -> Result<UserProfile, AuthError> {
    let mut profile = sessions.get(key).await?.ok_or(AuthError::NotSignedIn)?;
    apply_update(&mut profile, update);
    sessions.put(key, &profile).await?;
    bus.emit("Profile Updated", "Your portal settings have been synced successfully.", Severity::Success);
    Ok(profile)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
