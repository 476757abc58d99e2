//! Built-in portal data.
//!
//! Static catalogs (institutions, pricing, timetable, lecture roster), the
//! signup verification registries, and the defaults each repository falls
//! back to when its key is absent from the store.

use crate::models::{
    Conversation, EventCategory, Institution, InstitutionStatus, Message, PricingTier, Register,
    RosterStudent, SchoolEvent, SubscriptionTier, TimetableSlot, UserProfile, UserRole,
};

pub const DEFAULT_INSTITUTION: &str = "Sandton Tech Academy";
pub const DEFAULT_PHONE: &str = "011 456 7890";

pub const FACULTIES: [&str; 6] = [
    "Faculty of Science",
    "Faculty of Engineering",
    "Faculty of Commerce",
    "Faculty of Humanities",
    "Faculty of Health Sciences",
    "Faculty of Law",
];

// =============================================================================
// REGISTRIES
// =============================================================================

/// Fields merged into a profile when a signup identifier is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: &'static str,
    pub campus: &'static str,
    pub faculty: Option<&'static str>,
    pub course: Option<&'static str>,
    pub class_name: Option<&'static str>,
    pub teachers: &'static [&'static str],
}

const STUDENT_REGISTRY: [(&str, RegistryEntry); 2] = [
    (
        "STU2025001",
        RegistryEntry {
            name: "Thabo Mbeki",
            campus: "Main Campus",
            faculty: None,
            course: Some("BSc Computer Science"),
            class_name: Some("Level 100-A"),
            teachers: &["Mr. Khumalo"],
        },
    ),
    (
        "STU2025002",
        RegistryEntry {
            name: "Lerato Molefe",
            campus: "West Campus",
            faculty: None,
            course: Some("National Diploma: Engineering"),
            class_name: Some("Level 200-B"),
            teachers: &["Ms. Modise"],
        },
    ),
];

const LECTURER_REGISTRY: [(&str, RegistryEntry); 2] = [
    (
        "LEC-SCI-001",
        RegistryEntry {
            name: "Dr. Khumalo",
            campus: "Main Campus",
            faculty: Some("Faculty of Science"),
            course: None,
            class_name: None,
            teachers: &[],
        },
    ),
    (
        "LEC-ENG-002",
        RegistryEntry {
            name: "Prof. Modise",
            campus: "West Campus",
            faculty: Some("Faculty of Engineering"),
            course: None,
            class_name: None,
            teachers: &[],
        },
    ),
];

/// Look up a student number. Callers normalize to upper case first.
#[must_use]
pub fn lookup_student(student_number: &str) -> Option<RegistryEntry> {
    STUDENT_REGISTRY
        .iter()
        .find(|(id, _)| *id == student_number)
        .map(|(_, entry)| *entry)
}

/// Look up a lecturer id. Callers normalize to upper case first.
#[must_use]
pub fn lookup_lecturer(lecturer_id: &str) -> Option<RegistryEntry> {
    LECTURER_REGISTRY
        .iter()
        .find(|(id, _)| *id == lecturer_id)
        .map(|(_, entry)| *entry)
}

// =============================================================================
// CATALOGS
// =============================================================================

#[must_use]
pub fn institutions() -> Vec<Institution> {
    let row = |id: &str, name: &str, province: &str, tier, students_count| Institution {
        id: id.into(),
        name: name.into(),
        province: province.into(),
        tier,
        students_count,
        status: InstitutionStatus::Active,
    };
    vec![
        row("1", "University of Cape Town", "Western Cape", SubscriptionTier::Enterprise, 28_000),
        row("2", "Sandton Tech Academy", "Gauteng", SubscriptionTier::Professional, 5_500),
        row("3", "Durban University of Tech", "KwaZulu-Natal", SubscriptionTier::Professional, 15_000),
        row("4", "Polokwane Medical School", "Limpopo", SubscriptionTier::Starter, 1_200),
    ]
}

#[must_use]
pub fn pricing_tiers() -> Vec<PricingTier> {
    let entry = |tier, price: &str, annual: &str, users: &str, features: [&str; 4]| PricingTier {
        tier,
        price: price.into(),
        annual: annual.into(),
        users: users.into(),
        features: features.iter().map(|f| (*f).to_owned()).collect(),
    };
    vec![
        entry(
            SubscriptionTier::Starter,
            "R4,999",
            "R49,990",
            "500",
            ["Course Management", "Exam Timetables", "Lecture Attendance", "10GB Storage"],
        ),
        entry(
            SubscriptionTier::Professional,
            "R12,999",
            "R129,990",
            "5,000",
            ["All Starter Features", "SMS Multi-factor", "Faculty Portals", "LMS Integration"],
        ),
        entry(
            SubscriptionTier::Enterprise,
            "R39,999",
            "R399,990",
            "25,000+",
            ["Full University Cluster", "White-Label Branding", "Research Analytics", "Dedicated Node"],
        ),
    ]
}

pub const TIMETABLE_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
pub const TIMETABLE_HOURS: [&str; 7] = ["08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00"];

#[must_use]
pub fn timetable() -> Vec<TimetableSlot> {
    vec![
        TimetableSlot { day: "Monday", time: "08:00", subject: "Mathematics", room: "Room 4B", teacher: "Mr. Khumalo" },
        TimetableSlot { day: "Monday", time: "09:00", subject: "Life Sciences", room: "Lab 1", teacher: "Mrs. Jenkins" },
        TimetableSlot { day: "Tuesday", time: "10:00", subject: "History", room: "Room 12", teacher: "Ms. Modise" },
        TimetableSlot { day: "Wednesday", time: "08:00", subject: "English FAL", room: "Room 2", teacher: "Mr. Smith" },
        TimetableSlot { day: "Thursday", time: "13:00", subject: "Geography", room: "Room 9", teacher: "Ms. Dlamini" },
    ]
}

pub const ROSTER_MODULE: &str = "CS101";

#[must_use]
pub fn roster() -> Vec<RosterStudent> {
    const GROUP: &str = "CS101 - Group A";
    vec![
        RosterStudent { id: "1", name: "Zanele Dlamini", context: GROUP },
        RosterStudent { id: "2", name: "Lerato Mokoena", context: GROUP },
        RosterStudent { id: "3", name: "Tshepo Sithole", context: GROUP },
        RosterStudent { id: "4", name: "Naledi Gumede", context: GROUP },
        RosterStudent { id: "5", name: "Sibusiso Khumalo", context: GROUP },
    ]
}

// =============================================================================
// REPOSITORY DEFAULTS
// =============================================================================

#[must_use]
pub fn default_directory() -> Vec<UserProfile> {
    let member = |id: &str, name: &str, email: &str, role, phone: &str| {
        let mut profile = UserProfile::basic(id, name, email, role);
        phone.clone_into(&mut profile.phone);
        profile
    };
    vec![
        member("1", "Themba Khumalo", "themba.k@sandton.edu", UserRole::Teacher, "011 456 7890"),
        member("2", "Sarah Jenkins", "sarah.j@sandton.edu", UserRole::InstitutionAdmin, "011 456 7891"),
        member("3", "Bontle Modise", "bontle.m@parent.com", UserRole::Parent, "072 123 4567"),
    ]
}

#[must_use]
pub fn default_events() -> Vec<SchoolEvent> {
    vec![
        SchoolEvent {
            id: "1".into(),
            title: "Grade 10 Parent Meeting".into(),
            date: "2025-08-15".into(),
            time: "18:00".into(),
            location: "School Hall".into(),
            description: "Termly academic progress meeting.".into(),
            category: EventCategory::Admin,
            rsvps: Vec::new(),
        },
        SchoolEvent {
            id: "2".into(),
            title: "Inter-House Athletics".into(),
            date: "2025-08-20".into(),
            time: "08:30".into(),
            location: "Main Fields".into(),
            description: "House athletics competitions.".into(),
            category: EventCategory::Sports,
            rsvps: Vec::new(),
        },
    ]
}

#[must_use]
pub fn default_conversations() -> Vec<Conversation> {
    vec![Conversation {
        id: "1".into(),
        name: "Grade 10A Parents".into(),
        avatar: None,
        last_message: "Thank you for the update on the excursion.".into(),
        unread_count: 0,
        is_group: true,
        messages: vec![
            Message {
                id: "m1".into(),
                sender_id: "u2".into(),
                text: "Hi everyone, just a reminder about tomorrow's field trip.".into(),
                timestamp: "09:00".into(),
                is_read: true,
            },
            Message {
                id: "m2".into(),
                sender_id: "parent1".into(),
                text: "Thank you for the update on the excursion.".into(),
                timestamp: "09:15".into(),
                is_read: true,
            },
        ],
    }]
}

#[must_use]
pub fn default_register() -> Register {
    Register::new()
}

/// Helper for seeding a register in tests and demos.
#[cfg(test)]
pub fn register_of(entries: &[(&str, crate::models::AttendanceStatus)]) -> Register {
    entries
        .iter()
        .map(|(id, status)| ((*id).to_owned(), *status))
        .collect()
}
