//! Dashboard — per-role summary cards, the academic context bar, the
//! weekly engagement series and the institution report export.

use serde::Serialize;

use super::notify::EventBus;
use crate::access::Tab;
use crate::error::ErrorCode;
use crate::models::{Severity, UserProfile, UserRole};

/// One summary card; `target` is the tab it opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: &'static str,
    pub change: &'static str,
    pub target: Tab,
}

/// Course or faculty banner shown to students and lecturers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextBar {
    pub label: &'static str,
    pub heading: String,
    pub subheading: String,
    pub campus: String,
    pub badge: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyPoint {
    pub day: &'static str,
    pub attendance: u8,
    pub engagement: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub role_label: String,
    pub stats: Vec<StatCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextBar>,
    pub weekly: Vec<WeeklyPoint>,
}

pub const WEEKLY: [WeeklyPoint; 5] = [
    WeeklyPoint { day: "Mon", attendance: 92, engagement: 85 },
    WeeklyPoint { day: "Tue", attendance: 95, engagement: 88 },
    WeeklyPoint { day: "Wed", attendance: 98, engagement: 92 },
    WeeklyPoint { day: "Thu", attendance: 94, engagement: 81 },
    WeeklyPoint { day: "Fri", attendance: 89, engagement: 74 },
];

const fn card(title: &'static str, value: &'static str, change: &'static str, target: Tab) -> StatCard {
    StatCard { title, value, change, target }
}

/// Summary cards for `role`. Super admins and parents get none.
#[must_use]
pub fn stat_cards(role: UserRole) -> Vec<StatCard> {
    match role {
        UserRole::InstitutionAdmin => vec![
            card("Total Students", "12,450", "+8%", Tab::Users),
            card("Campus Blasts", "42", "+5", Tab::Announcements),
            card("Lecture Attendance", "88.4%", "-2.1%", Tab::Attendance),
            card("Campus Status", "Active", "99.9%", Tab::Institutions),
        ],
        UserRole::Teacher => vec![
            card("Module Students", "256", "CS101 / CS202", Tab::Messaging),
            card("Registers Signed", "100%", "Today", Tab::Attendance),
            card("Lectures Today", "3", "Next at 14:00", Tab::Timetable),
            card("Exams Pending", "2", "Finalized", Tab::Events),
        ],
        UserRole::Student => vec![
            card("Lecture Participation", "95%", "+3%", Tab::Attendance),
            card("Course Credits", "120", "Current", Tab::Timetable),
            card("Today's Schedule", "4", "2 Done", Tab::Timetable),
            card("Exam Notices", "1", "Released", Tab::Events),
        ],
        UserRole::SuperAdmin | UserRole::Parent => Vec::new(),
    }
}

fn or_default(value: Option<&String>, default: &str) -> String {
    value.map_or_else(|| default.to_owned(), Clone::clone)
}

#[must_use]
pub fn context_bar(profile: &UserProfile) -> Option<ContextBar> {
    let campus = or_default(profile.campus.as_ref(), "Main Campus");
    match profile.role {
        UserRole::Student => Some(ContextBar {
            label: "Course Enrollment",
            heading: or_default(profile.course.as_ref(), "BSc Computer Science"),
            subheading: or_default(profile.class_name.as_ref(), "Level 100-A"),
            campus,
            badge: format!("Student ID: {}", profile.student_number.as_deref().unwrap_or("TRIAL")),
        }),
        UserRole::Teacher => Some(ContextBar {
            label: "Faculty Assignment",
            heading: or_default(profile.faculty.as_ref(), "Faculty of Science"),
            subheading: "Senior Academic Staff".to_owned(),
            campus,
            badge: format!("Lecturer ID: {}", profile.lecturer_id.as_deref().unwrap_or("TRIAL")),
        }),
        UserRole::SuperAdmin | UserRole::InstitutionAdmin | UserRole::Parent => None,
    }
}

#[must_use]
pub fn overview(profile: &UserProfile) -> Overview {
    Overview {
        role_label: profile.role.label(),
        stats: stat_cards(profile.role),
        context: context_bar(profile),
        weekly: WEEKLY.to_vec(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("only institution admins can export the monthly report")]
    AdminOnly,
}

impl ErrorCode for DashboardError {
    fn error_code(&self) -> &'static str {
        "E_REPORT_ADMIN_ONLY"
    }

    fn retryable(&self) -> bool {
        false
    }
}

/// "Export Data" on the institution admin dashboard. Publishes
/// "Export Started".
///
/// # Errors
///
/// Returns [`DashboardError::AdminOnly`] for any other role.
pub fn export_report(bus: &EventBus, role: UserRole) -> Result<(), DashboardError> {
    if role != UserRole::InstitutionAdmin {
        return Err(DashboardError::AdminOnly);
    }
    bus.emit("Export Started", "Generating monthly institutional report...", Severity::Info);
    Ok(())
}
