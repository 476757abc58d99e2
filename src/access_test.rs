use super::*;

// =============================================================================
// route
// =============================================================================

#[test]
fn every_unpermitted_pair_routes_to_forbidden() {
    for tab in Tab::ALL {
        for role in UserRole::ALL {
            let view = route(tab.as_str(), role);
            if is_permitted(tab, role) {
                assert_ne!(view, View::Forbidden, "{tab:?} should open for {role}");
                assert_ne!(view, View::UnderConstruction);
            } else {
                assert_eq!(view, View::Forbidden, "{tab:?} must be forbidden for {role}");
            }
        }
    }
}

#[test]
fn unknown_tab_is_under_construction_for_every_role() {
    for role in UserRole::ALL {
        assert_eq!(route("grades", role), View::UnderConstruction);
        assert_eq!(route("", role), View::UnderConstruction);
        assert_eq!(route("Dashboard", role), View::UnderConstruction);
    }
}

#[test]
fn restricted_tabs_match_capability_table() {
    assert_eq!(route("announcements", UserRole::Teacher), View::AnnouncementCreator);
    assert_eq!(route("announcements", UserRole::Student), View::Forbidden);
    assert_eq!(route("pricing", UserRole::SuperAdmin), View::Pricing);
    assert_eq!(route("pricing", UserRole::Teacher), View::Forbidden);
    assert_eq!(route("users", UserRole::InstitutionAdmin), View::UserManagement);
    assert_eq!(route("users", UserRole::Parent), View::Forbidden);
    assert_eq!(route("attendance", UserRole::Teacher), View::Attendance);
    assert_eq!(route("attendance", UserRole::SuperAdmin), View::Forbidden);
    assert_eq!(route("institutions", UserRole::Student), View::Forbidden);
}

#[test]
fn unrestricted_tabs_open_for_everyone() {
    for role in UserRole::ALL {
        assert_eq!(route("dashboard", role), View::Dashboard);
        assert_eq!(route("timetable", role), View::Timetable);
        assert_eq!(route("messaging", role), View::Messaging);
        assert_eq!(route("events", role), View::Events);
        assert_eq!(route("settings", role), View::Settings);
    }
}

// =============================================================================
// authorize
// =============================================================================

#[test]
fn authorize_reports_tab_and_role() {
    let err = authorize(Tab::Pricing, UserRole::Parent).unwrap_err();
    assert!(matches!(err, AccessError::Forbidden { tab: Tab::Pricing, role: UserRole::Parent }));
    assert_eq!(err.error_code(), "E_FORBIDDEN");
    assert!(err.to_string().contains("pricing"));
    assert!(authorize(Tab::Pricing, UserRole::InstitutionAdmin).is_ok());
}

#[test]
fn tab_parse_round_trips() {
    for tab in Tab::ALL {
        assert_eq!(Tab::parse(tab.as_str()), Some(tab));
    }
}

// =============================================================================
// navigation
// =============================================================================

#[test]
fn parent_navigation_omits_timetable_and_settings() {
    let ids: Vec<Tab> = navigation(UserRole::Parent).iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![Tab::Dashboard, Tab::Messaging, Tab::Events]);
}

#[test]
fn navigation_never_offers_a_forbidden_tab() {
    for role in UserRole::ALL {
        for item in navigation(role) {
            assert!(is_permitted(item.id, role), "{:?} offered to {role} but not permitted", item.id);
        }
    }
}

#[test]
fn institution_admin_sees_full_sidebar() {
    let nav = navigation(UserRole::InstitutionAdmin);
    assert_eq!(nav.len(), Tab::ALL.len());
    assert_eq!(nav[0].label, "Dashboard");
}
