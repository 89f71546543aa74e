//! Catalog lookup endpoints consumed by the portal forms.

use crate::error::AppError;
use crate::extractors::SessionUser;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use release_portal_releases::types::{JobRole, RoleType, Tutorial};
use serde::Deserialize;

/// Query string of `GET /api/job-roles`.
#[derive(Debug, Deserialize)]
pub struct JobRoleQuery {
    /// Restrict to one enumeration: `department` or `client_role`.
    #[serde(rename = "type")]
    pub role_type: Option<String>,
}

/// `GET /api/tutorials`: the full tutorial catalog.
///
/// # Errors
///
/// 500 on catalog failure.
pub async fn list_tutorials(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Tutorial>>, AppError> {
    let tutorials = state.catalog.get_all().await?;
    Ok(Json(tutorials))
}

/// `GET /api/job-roles`: active department / client-role entries, ordered
/// for display.
///
/// # Errors
///
/// 400 on an unknown `type` value, 500 on lookup failure.
pub async fn list_job_roles(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
    Query(query): Query<JobRoleQuery>,
) -> Result<Json<Vec<JobRole>>, AppError> {
    let role_type = match query.role_type.as_deref() {
        None => None,
        Some("department") => Some(RoleType::Department),
        Some("client_role") => Some(RoleType::ClientRole),
        Some(other) => {
            return Err(AppError::bad_request(format!(
                "Invalid role type '{other}'. Use: department, client_role"
            )))
        }
    };

    let roles = state.job_roles.get_active(role_type).await?;
    Ok(Json(roles))
}
