//! Lecture register — the CS101 attendance draft and its analysis.
//!
//! The draft survives restarts through the attendance repository. Marking
//! only accepts students on the fixed roster. Finalizing announces the sync
//! and leaves the draft in place for the next edit.

use tracing::info;

use super::assistant::{Assistant, AttendanceInsights};
use super::notify::EventBus;
use crate::error::ErrorCode;
use crate::models::{AttendanceStatus, Register, RosterStudent, Severity};
use crate::seed::{self, ROSTER_MODULE};
use crate::store::{JsonRepository, StoreError};

pub type AttendanceRepository = JsonRepository<Register>;

#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    #[error("student {0} is not on the module roster")]
    UnknownStudent(String),
    #[error("mark at least one student before finalizing the register")]
    EmptyRegister,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for AttendanceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownStudent(_) => "E_STUDENT_NOT_ON_ROSTER",
            Self::EmptyRegister => "E_REGISTER_EMPTY",
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

#[must_use]
pub fn roster() -> Vec<RosterStudent> {
    seed::roster()
}

/// # Errors
///
/// Returns an error if the store cannot be read.
pub async fn register(repo: &AttendanceRepository) -> Result<Register, AttendanceError> {
    Ok(repo.load().await?)
}

/// Set one student's status in the draft. Returns the whole draft.
///
/// # Errors
///
/// Returns [`AttendanceError::UnknownStudent`] or a store error.
pub async fn mark(
    repo: &AttendanceRepository,
    student_id: &str,
    status: AttendanceStatus,
) -> Result<Register, AttendanceError> {
    if !seed::roster().iter().any(|s| s.id == student_id) {
        return Err(AttendanceError::UnknownStudent(student_id.to_owned()));
    }
    repo.update(|register| {
        register.insert(student_id.to_owned(), status);
        Ok::<_, AttendanceError>(register.clone())
    })
    .await
}

/// Submit the draft and publish "Lecture Register Finalized". Returns the
/// number of students marked.
///
/// # Errors
///
/// Returns [`AttendanceError::EmptyRegister`] when nobody is marked, or a
/// store error.
pub async fn finalize(repo: &AttendanceRepository, bus: &EventBus) -> Result<usize, AttendanceError> {
    let register = register(repo).await?;
    if register.is_empty() {
        return Err(AttendanceError::EmptyRegister);
    }
    info!(module = ROSTER_MODULE, marked = register.len(), "register finalized");
    bus.emit(
        "Lecture Register Finalized",
        format!("Participation data for {ROSTER_MODULE} has been synced with Faculty records."),
        Severity::Success,
    );
    Ok(register.len())
}

/// One-line description of the draft handed to the assistant.
#[must_use]
pub fn summary(register: &Register) -> String {
    let count = |wanted: AttendanceStatus| register.values().filter(|s| **s == wanted).count();
    format!(
        "Module {ROSTER_MODULE} Attendance: {} total students. {} absent, {} late. Note: Early morning lecture (08:00).",
        seed::roster().len(),
        count(AttendanceStatus::Absent),
        count(AttendanceStatus::Late),
    )
}

/// Ask the assistant about the current draft, then publish "Engagement
/// Analysis Complete" whether or not insights came back.
///
/// # Errors
///
/// Returns an error only if the store cannot be read.
pub async fn analyze(
    repo: &AttendanceRepository,
    assistant: &Assistant,
    bus: &EventBus,
    user_id: &str,
) -> Result<Option<AttendanceInsights>, AttendanceError> {
    let register = register(repo).await?;
    let insights = assistant.analyze_attendance(user_id, &summary(&register)).await;
    bus.emit(
        "Engagement Analysis Complete",
        "Module participation patterns generated for Principal Investigator.",
        Severity::Info,
    );
    Ok(insights)
}

#[cfg(test)]
#[path = "attendance_test.rs"]
mod tests;
