//! Institution user directory — search, enrollment, per-member actions and
//! export.

use std::fmt;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::notify::EventBus;
use crate::error::ErrorCode;
use crate::models::{Severity, UserProfile, UserRole};
use crate::store::{JsonRepository, StoreError};

pub const PENDING_PHONE: &str = "Pending Update";

pub type DirectoryRepository = JsonRepository<Vec<UserProfile>>;

/// The "enroll member" form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    #[serde(default = "default_member_role")]
    pub role: UserRole,
}

fn default_member_role() -> UserRole {
    UserRole::Student
}

/// Row actions on a directory member. Acknowledged only; the member record
/// is left as it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberAction {
    Edit,
    Permissions,
    Delete,
}

impl fmt::Display for MemberAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Edit => "Edit",
            Self::Permissions => "Permissions",
            Self::Delete => "Delete",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("name and email are required")]
    MissingField,
    #[error("no directory member {0}")]
    UnknownMember(String),
    #[error("directory export failed: {0}")]
    Export(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for DirectoryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField => "E_MEMBER_FIELDS_REQUIRED",
            Self::UnknownMember(_) => "E_MEMBER_NOT_FOUND",
            Self::Export(_) => "E_EXPORT_FAILED",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

/// Members whose name or email contains `query`, ignoring case. A blank
/// query matches everyone.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn search(repo: &DirectoryRepository, query: &str) -> Result<Vec<UserProfile>, DirectoryError> {
    let needle = query.trim().to_lowercase();
    let members = repo.load().await?;
    Ok(members
        .into_iter()
        .filter(|m| m.name.to_lowercase().contains(&needle) || m.email.to_lowercase().contains(&needle))
        .collect())
}

/// Enroll a member at the top of the directory and publish "User Enrolled".
///
/// # Errors
///
/// Returns [`DirectoryError::MissingField`] for a blank name or email, or a
/// store error.
pub async fn add(repo: &DirectoryRepository, bus: &EventBus, new: NewMember) -> Result<UserProfile, DirectoryError> {
    let (name, email) = (new.name.trim(), new.email.trim());
    if name.is_empty() || email.is_empty() {
        return Err(DirectoryError::MissingField);
    }
    let mut member = UserProfile::basic(Uuid::new_v4().to_string(), name, email, new.role);
    PENDING_PHONE.clone_into(&mut member.phone);

    let enrolled = member.clone();
    repo.update(|members| {
        members.insert(0, enrolled);
        Ok::<_, DirectoryError>(())
    })
    .await?;

    info!(member_id = %member.id, role = %member.role, "member enrolled");
    bus.emit("User Enrolled", format!("{} has been added to the institution system.", member.name), Severity::Success);
    Ok(member)
}

/// Acknowledge `action` on member `member_id` with a "Member {action}" notice.
///
/// # Errors
///
/// Returns [`DirectoryError::UnknownMember`] when no member has that id, or
/// a store error.
pub async fn member_action(
    repo: &DirectoryRepository,
    bus: &EventBus,
    member_id: &str,
    action: MemberAction,
) -> Result<UserProfile, DirectoryError> {
    let member = repo
        .load()
        .await?
        .into_iter()
        .find(|m| m.id == member_id)
        .ok_or_else(|| DirectoryError::UnknownMember(member_id.to_owned()))?;
    info!(member_id, %action, "member action requested");
    bus.emit(format!("Member {action}"), format!("Action processed for {}.", member.name), Severity::Info);
    Ok(member)
}

/// Whole directory as JSON lines, one profile per line. Publishes
/// "Exporting Directory" first.
///
/// # Errors
///
/// Returns a store or serialization error.
pub async fn export_jsonl(repo: &DirectoryRepository, bus: &EventBus) -> Result<String, DirectoryError> {
    bus.emit("Exporting Directory", "Preparing CSV export for all institutional users...", Severity::Info);
    let mut out = String::new();
    for member in repo.load().await? {
        out.push_str(&serde_json::to_string(&member)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
