//! Employee-facing release endpoints.
//!
//! All handlers here require a portal session ([`SessionUser`]). Creation
//! paths dispatch the fulfillment webhook best-effort: a delivery failure is
//! logged and the created release is still returned.

use crate::error::AppError;
use crate::extractors::SessionUser;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use release_portal_releases::bulk::{self, BulkReport};
use release_portal_releases::providers::ReportFilter;
use release_portal_releases::types::{Release, ReleaseSubmission, ReleaseWithCreator};
use release_portal_releases::validate::{validate_submission, validate_tutorial_ids};
use release_portal_releases::EffectiveStatus;
use serde::Deserialize;
use tracing::{info, warn};

/// Body of `POST /api/tutorial-releases`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReleaseRequest {
    /// Client and company fields.
    #[serde(flatten)]
    pub submission: ReleaseSubmission,
    /// Tutorials to grant.
    pub tutorial_ids: Vec<String>,
}

/// Body of `POST /api/tutorial-releases/bulk`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    /// Client/company rows, processed independently.
    pub releases: Vec<ReleaseSubmission>,
    /// Tutorial selection applied to every row.
    pub tutorial_ids: Vec<String>,
}

/// Query string of `GET /api/reports/tutorial-releases`.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Effective-status filter; absent or `all` means no filter.
    pub status: Option<String>,
}

/// `POST /api/tutorial-releases`: create one release.
///
/// Validates, persists as `pending`, then dispatches the webhook. Returns
/// the created release even when dispatch fails.
///
/// # Errors
///
/// 400 on validation failure, 500 on store failure.
pub async fn create_release(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    Json(body): Json<CreateReleaseRequest>,
) -> Result<Json<Release>, AppError> {
    validate_submission(&body.submission)?;
    validate_tutorial_ids(&body.tutorial_ids)?;

    let release = state
        .store
        .create(body.submission.into_new_release(body.tutorial_ids, user.id))
        .await?;
    info!(release_id = %release.id, user_id = %user.id, "Release created");

    notify_best_effort(&state, &release).await;

    Ok(Json(release))
}

/// `GET /api/tutorial-releases`: all releases with their creator.
///
/// # Errors
///
/// 500 on store failure.
pub async fn list_releases(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReleaseWithCreator>>, AppError> {
    let releases = state.store.get_all().await?;
    Ok(Json(releases))
}

/// `POST /api/tutorial-releases/bulk`: create many releases from parsed
/// spreadsheet rows.
///
/// Row failures land in the report; only an unusable tutorial selection
/// rejects the request as a whole.
///
/// # Errors
///
/// 400 when the tutorial selection is empty or blank.
pub async fn bulk_create(
    SessionUser(user): SessionUser,
    State(state): State<AppState>,
    Json(body): Json<BulkCreateRequest>,
) -> Result<Json<BulkReport>, AppError> {
    let report = bulk::process(
        body.releases,
        body.tutorial_ids,
        user.id,
        state.store.as_ref(),
        state.catalog.as_ref(),
        state.notifier.as_ref(),
    )
    .await?;
    Ok(Json(report))
}

/// `GET /api/reports/tutorial-releases`: rows feeding the spreadsheet
/// report, optionally filtered by effective status.
///
/// # Errors
///
/// 400 on an unknown status value, 500 on store failure.
pub async fn report(
    SessionUser(_user): SessionUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<ReleaseWithCreator>>, AppError> {
    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(value) => Some(value.parse::<EffectiveStatus>()?),
    };

    let rows = state
        .store
        .get_for_report(ReportFilter {
            user_id: None,
            status,
        })
        .await?;
    Ok(Json(rows))
}

/// Resolve tutorials and dispatch the creation webhook, logging any failure.
pub(crate) async fn notify_best_effort(state: &AppState, release: &Release) {
    match state.catalog.get_by_ids(release.tutorial_ids.clone()).await {
        Ok(tutorials) => {
            if let Err(error) = state
                .notifier
                .notify_created(release.clone(), tutorials)
                .await
            {
                warn!(release_id = %release.id, %error, "Webhook dispatch failed, release kept");
            }
        }
        Err(error) => {
            warn!(release_id = %release.id, %error, "Tutorial lookup for webhook failed, release kept");
        }
    }
}
