use super::*;

#[test]
fn role_parse_accepts_wire_names() {
    for role in UserRole::ALL {
        assert_eq!(UserRole::parse(role.as_str()), Some(role));
    }
    assert_eq!(UserRole::parse("principal"), None);
    assert_eq!(UserRole::parse("Teacher"), None);
}

#[test]
fn role_label_replaces_first_underscore() {
    assert_eq!(UserRole::InstitutionAdmin.label(), "institution admin");
    assert_eq!(UserRole::Student.label(), "student");
}

#[test]
fn profile_serializes_camel_case_and_skips_empty_fields() {
    let mut profile = UserProfile::basic("u_1", "Zanele", "zanele@uct.ac.za", UserRole::Student);
    profile.student_number = Some("STU2025001".into());

    let value = serde_json::to_value(&profile).unwrap();
    assert_eq!(value["role"], "student");
    assert_eq!(value["studentNumber"], "STU2025001");
    assert!(value.get("lecturerId").is_none());
    assert!(value.get("institutionId").is_none());
}

#[test]
fn profile_reads_stored_front_end_shape() {
    let raw = r#"{"id":"u_abc","name":"Dr. Khumalo","email":"k@uct.ac.za","role":"teacher",
        "phone":"011 456 7890","lecturerId":"LEC-SCI-001","faculty":"Faculty of Science","campus":"Main Campus"}"#;
    let profile: UserProfile = serde_json::from_str(raw).unwrap();
    assert_eq!(profile.role, UserRole::Teacher);
    assert_eq!(profile.lecturer_id.as_deref(), Some("LEC-SCI-001"));
    assert_eq!(profile.campus.as_deref(), Some("Main Campus"));
    assert!(profile.student_number.is_none());
}

#[test]
fn notification_uses_type_field_for_severity() {
    let notification = AppNotification {
        id: "abc123def".into(),
        title: "Profile Updated".into(),
        message: "Saved".into(),
        severity: Severity::Success,
        timestamp: OffsetDateTime::UNIX_EPOCH,
    };
    let value = serde_json::to_value(&notification).unwrap();
    assert_eq!(value["type"], "success");
    assert_eq!(value["timestamp"], "1970-01-01T00:00:00Z");
}

#[test]
fn event_without_rsvps_defaults_to_empty() {
    let raw = r#"{"id":"9","title":"Chess Final","date":"2025-08-09","time":"10:00",
        "location":"Library","description":"","category":"Cultural"}"#;
    let event: SchoolEvent = serde_json::from_str(raw).unwrap();
    assert!(event.rsvps.is_empty());
    assert_eq!(event.category, EventCategory::Cultural);
}

#[test]
fn subscription_tier_parse_is_case_insensitive() {
    assert_eq!(SubscriptionTier::parse("enterprise"), Some(SubscriptionTier::Enterprise));
    assert_eq!(SubscriptionTier::parse("Starter"), Some(SubscriptionTier::Starter));
    assert_eq!(SubscriptionTier::parse("gold"), None);
}
