//! Role router over HTTP — sidebar entries and tab resolution.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use super::auth::AuthProfile;
use crate::access::{self, NavItem, View};
use crate::error::ApiError;
use crate::services::dashboard::{self, Overview};

const FORBIDDEN_MESSAGE: &str = "Access Restricted: your current account role does not have administrative \
                                 permission to view this module. Please contact your HOD.";
const PENDING_MESSAGE: &str = "New Module Pending: we're finalizing this specialized module.";

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub tab: String,
    pub view: View,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<Overview>,
}

/// `GET /api/nav`
pub async fn nav(auth: AuthProfile) -> Json<Vec<NavItem>> {
    Json(access::navigation(auth.profile.role))
}

/// `GET /api/views/{tab}` — 403 for a restricted tab, 404 for an unknown
/// one. The dashboard view carries its overview inline.
pub async fn view(auth: AuthProfile, Path(tab): Path<String>) -> Result<Json<ViewResponse>, ApiError> {
    match access::route(&tab, auth.profile.role) {
        View::Forbidden => Err(ApiError::plain(StatusCode::FORBIDDEN, "E_FORBIDDEN", FORBIDDEN_MESSAGE)),
        View::UnderConstruction => Err(ApiError::plain(StatusCode::NOT_FOUND, "E_MODULE_PENDING", PENDING_MESSAGE)),
        view => {
            let dashboard = (view == View::Dashboard).then(|| dashboard::overview(&auth.profile));
            Ok(Json(ViewResponse { tab, view, dashboard }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserProfile, UserRole};

    fn auth(role: UserRole) -> AuthProfile {
        AuthProfile { profile: UserProfile::basic("u", "N", "n@x", role), key: "k".into() }
    }

    #[tokio::test]
    async fn forbidden_tab_is_403() {
        let err = view(auth(UserRole::Student), Path("pricing".into())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert!(err.message.starts_with("Access Restricted"));
    }

    #[tokio::test]
    async fn unknown_tab_is_404() {
        let err = view(auth(UserRole::SuperAdmin), Path("library".into())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "E_MODULE_PENDING");
    }

    #[tokio::test]
    async fn permitted_tab_resolves_view() {
        let Json(resp) = view(auth(UserRole::Teacher), Path("attendance".into())).await.unwrap();
        assert_eq!(resp.view, View::Attendance);
        assert!(resp.dashboard.is_none());

        let Json(resp) = view(auth(UserRole::Teacher), Path("dashboard".into())).await.unwrap();
        assert_eq!(resp.dashboard.unwrap().stats.len(), 4);
    }

    #[tokio::test]
    async fn nav_follows_role() {
        let Json(items) = nav(auth(UserRole::Parent)).await;
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["dashboard", "messaging", "events"]);
    }
}
