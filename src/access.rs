//! Role router — capability table and the single authorization gate.
//!
//! DESIGN
//! ======
//! Access rules live in exactly one table (`CAPABILITIES`): tab -> roles
//! allowed to open it. Tabs absent from the table are open to every role.
//! `route` turns any (tab id, role) pair into exactly one `View`, and
//! `authorize` is the gate every mutating endpoint calls before touching
//! a feature service. Views and services carry no role checks of their own
//! beyond feature-specific rules (e.g. who may host an event).
//!
//! The sidebar table (`NAV_ITEMS`) is separate: it decides what a role is
//! *offered*, not what it is *allowed*.

use serde::Serialize;

use crate::error::ErrorCode;
use crate::models::UserRole;

use crate::models::UserRole::{InstitutionAdmin, Parent, Student, SuperAdmin, Teacher};

// =============================================================================
// TABS & VIEWS
// =============================================================================

/// Identifier of one top-level portal view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Dashboard,
    Institutions,
    Users,
    Announcements,
    Attendance,
    Timetable,
    Messaging,
    Events,
    Pricing,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 10] = [
        Tab::Dashboard,
        Tab::Institutions,
        Tab::Users,
        Tab::Announcements,
        Tab::Attendance,
        Tab::Timetable,
        Tab::Messaging,
        Tab::Events,
        Tab::Pricing,
        Tab::Settings,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Institutions => "institutions",
            Self::Users => "users",
            Self::Announcements => "announcements",
            Self::Attendance => "attendance",
            Self::Timetable => "timetable",
            Self::Messaging => "messaging",
            Self::Events => "events",
            Self::Pricing => "pricing",
            Self::Settings => "settings",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.as_str() == raw)
    }

    fn view(self) -> View {
        match self {
            Self::Dashboard => View::Dashboard,
            Self::Institutions => View::Institutions,
            Self::Users => View::UserManagement,
            Self::Announcements => View::AnnouncementCreator,
            Self::Attendance => View::Attendance,
            Self::Timetable => View::Timetable,
            Self::Messaging => View::Messaging,
            Self::Events => View::Events,
            Self::Pricing => View::Pricing,
            Self::Settings => View::Settings,
        }
    }
}

/// What the portal renders for a (tab, role) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Dashboard,
    Institutions,
    UserManagement,
    AnnouncementCreator,
    Attendance,
    Timetable,
    Messaging,
    Events,
    Pricing,
    Settings,
    /// The role is not entitled to the requested tab.
    Forbidden,
    /// The tab identifier is not part of the portal.
    UnderConstruction,
}

// =============================================================================
// CAPABILITY TABLE
// =============================================================================

const CAPABILITIES: &[(Tab, &[UserRole])] = &[
    (Tab::Announcements, &[InstitutionAdmin, Teacher, SuperAdmin]),
    (Tab::Pricing, &[InstitutionAdmin, SuperAdmin]),
    (Tab::Institutions, &[InstitutionAdmin, SuperAdmin]),
    (Tab::Users, &[InstitutionAdmin, SuperAdmin]),
    (Tab::Attendance, &[InstitutionAdmin, Teacher]),
];

/// Roles allowed to open `tab`, or `None` when the tab is unrestricted.
#[must_use]
pub fn permitted_roles(tab: Tab) -> Option<&'static [UserRole]> {
    CAPABILITIES
        .iter()
        .find(|(restricted, _)| *restricted == tab)
        .map(|(_, roles)| *roles)
}

#[must_use]
pub fn is_permitted(tab: Tab, role: UserRole) -> bool {
    permitted_roles(tab).is_none_or(|roles| roles.contains(&role))
}

// =============================================================================
// GATE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("role {role} may not open the {} module", tab.as_str())]
    Forbidden { tab: Tab, role: UserRole },
}

impl ErrorCode for AccessError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden { .. } => "E_FORBIDDEN",
        }
    }
}

/// The single authorization gate.
///
/// # Errors
///
/// Returns [`AccessError::Forbidden`] when `role` is not listed for `tab`.
pub fn authorize(tab: Tab, role: UserRole) -> Result<(), AccessError> {
    if is_permitted(tab, role) { Ok(()) } else { Err(AccessError::Forbidden { tab, role }) }
}

/// Map a raw tab identifier and role to the view to render. Total: every
/// input yields exactly one view.
#[must_use]
pub fn route(tab_id: &str, role: UserRole) -> View {
    let Some(tab) = Tab::parse(tab_id) else {
        return View::UnderConstruction;
    };
    match authorize(tab, role) {
        Ok(()) => tab.view(),
        Err(_) => View::Forbidden,
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// One sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub id: Tab,
    pub label: &'static str,
}

const EVERYONE: &[UserRole] = &[SuperAdmin, InstitutionAdmin, Teacher, Student, Parent];

const NAV_ITEMS: &[(Tab, &str, &[UserRole])] = &[
    (Tab::Dashboard, "Dashboard", EVERYONE),
    (Tab::Institutions, "Campuses", &[SuperAdmin, InstitutionAdmin]),
    (Tab::Users, "Enrollment", &[SuperAdmin, InstitutionAdmin]),
    (Tab::Announcements, "Broadcasts", &[SuperAdmin, InstitutionAdmin, Teacher]),
    (Tab::Attendance, "Lecture Register", &[InstitutionAdmin, Teacher]),
    (Tab::Timetable, "Lecture Schedule", &[InstitutionAdmin, Teacher, Student]),
    (Tab::Messaging, "Comms", EVERYONE),
    (Tab::Events, "Campus Life", EVERYONE),
    (Tab::Pricing, "Institutional Billing", &[SuperAdmin, InstitutionAdmin]),
    (Tab::Settings, "Preferences", &[SuperAdmin, InstitutionAdmin, Teacher, Student]),
];

/// Sidebar entries offered to `role`, in display order.
#[must_use]
pub fn navigation(role: UserRole) -> Vec<NavItem> {
    NAV_ITEMS
        .iter()
        .filter(|(_, _, roles)| roles.contains(&role))
        .map(|(id, label, _)| NavItem { id: *id, label: *label })
        .collect()
}

#[cfg(test)]
#[path = "access_test.rs"]
mod tests;
