//! Portal domain records.
//!
//! DESIGN
//! ======
//! Every record here is stored verbatim as JSON by the repositories in
//! `crate::store`. Field names serialize in camelCase so stored documents
//! keep the shape the portal front end already reads. Nothing beyond
//! "valid JSON matching the shape" is enforced on load.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// ROLES
// =============================================================================

/// The five fixed user categories governing view access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    InstitutionAdmin,
    Teacher,
    Student,
    Parent,
}

impl UserRole {
    #[cfg(test)]
    pub const ALL: [UserRole; 5] =
        [UserRole::SuperAdmin, UserRole::InstitutionAdmin, UserRole::Teacher, UserRole::Student, UserRole::Parent];

    /// Wire identifier, e.g. `"institution_admin"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::InstitutionAdmin => "institution_admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Parent => "parent",
        }
    }

    #[cfg(test)]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == raw)
    }

    /// Human label used in portal headings (`"institution admin"`).
    #[must_use]
    pub fn label(self) -> String {
        self.as_str().replacen('_', " ", 1)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// USER PROFILE
// =============================================================================

/// A signed-in (or directory-listed) portal user. The profile itself is the
/// whole session: it is stored as-is under the session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecturer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teachers: Option<Vec<String>>,
}

impl UserProfile {
    /// A profile with only the identity fields set.
    #[must_use]
    pub fn basic(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role,
            phone: String::new(),
            institution_id: None,
            avatar: None,
            student_number: None,
            lecturer_id: None,
            faculty: None,
            campus: None,
            course: None,
            class_name: None,
            teachers: None,
        }
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Toast severity. Serialized as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Alert,
}

/// A live toast. Held in memory only, newest first, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppNotification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

// =============================================================================
// INSTITUTIONS & BILLING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionTier {
    Starter,
    Professional,
    Enterprise,
}

impl SubscriptionTier {
    /// Case-insensitive tier name, as printed on the pricing cards.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "starter" => Some(Self::Starter),
            "professional" => Some(Self::Professional),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Starter => "Starter",
            Self::Professional => "Professional",
            Self::Enterprise => "Enterprise",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstitutionStatus {
    Active,
    Suspended,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub province: String,
    pub tier: SubscriptionTier,
    pub students_count: u32,
    pub status: InstitutionStatus,
}

/// One row of the billing price list. Amounts are display strings in rand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingTier {
    pub tier: SubscriptionTier,
    pub price: String,
    pub annual: String,
    pub users: String,
    pub features: Vec<String>,
}

// =============================================================================
// MESSAGING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    /// Wall-clock `HH:MM` display time.
    pub timestamp: String,
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub last_message: String,
    pub unread_count: u32,
    pub is_group: bool,
    pub messages: Vec<Message>,
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventCategory {
    Sports,
    #[default]
    Academic,
    Admin,
    Cultural,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sports => "Sports",
            Self::Academic => "Academic",
            Self::Admin => "Admin",
            Self::Cultural => "Cultural",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolEvent {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    pub location: String,
    pub description: String,
    pub category: EventCategory,
    /// IDs of users who confirmed attendance.
    #[serde(default)]
    pub rsvps: Vec<String>,
}

// =============================================================================
// ATTENDANCE & TIMETABLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

/// Attendance draft: student id -> status. Ordered for stable output.
pub type Register = BTreeMap<String, AttendanceStatus>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterStudent {
    pub id: &'static str,
    pub name: &'static str,
    pub context: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableSlot {
    pub day: &'static str,
    pub time: &'static str,
    pub subject: &'static str,
    pub room: &'static str,
    pub teacher: &'static str,
}

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;
