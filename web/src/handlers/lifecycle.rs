//! Automation-facing lifecycle endpoints.
//!
//! All handlers here require the shared API key ([`ApiKeyAuth`]). This is
//! the surface the external fulfillment system uses to confirm releases and
//! poll their state; it is the source of truth the webhook is not.

use crate::error::AppError;
use crate::extractors::ApiKeyAuth;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use release_portal_releases::types::{Release, ReleaseStats};
use release_portal_releases::{ConfirmedStatus, EffectiveStatus};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Body of `POST /api/tutorial-releases/:id/status`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    /// New status; must be `pending`, `success` or `failed`.
    pub status: String,
    /// Optional free-text note from the confirming system, logged only.
    pub message: Option<String>,
}

/// Response of the status update endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    /// Confirmation message.
    pub message: &'static str,
    /// The release that was updated.
    pub release_id: Uuid,
    /// The stored status after the update.
    pub status: String,
}

/// Response of `GET /api/tutorial-releases/status/:status`.
#[derive(Debug, Serialize)]
pub struct StatusListResponse {
    /// The requested status.
    pub status: String,
    /// Number of matching releases.
    pub count: usize,
    /// The matching releases, newest-first.
    pub releases: Vec<Release>,
}

/// One row of the condensed pending feed.
#[derive(Debug, Serialize)]
pub struct PendingRelease {
    /// Release id.
    pub id: Uuid,
    /// Client name.
    pub client_name: String,
    /// Client email.
    pub client_email: String,
    /// Company name.
    pub client_company: String,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Always `pending`.
    pub status: String,
}

/// Response of `GET /api/tutorial-releases/pending`.
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    /// Number of pending releases.
    pub count: usize,
    /// Condensed rows for polling integrations.
    pub pending_releases: Vec<PendingRelease>,
}

/// `POST /api/tutorial-releases/:id/status`: apply an external confirmation.
///
/// `success` opens the validity window, `failed` and `pending` close it.
/// Concurrent confirmations are last-write-wins.
///
/// # Errors
///
/// 400 on a status outside `{pending, success, failed}` (the target release
/// is not touched), 404 on an unknown id.
pub async fn update_status(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<StatusUpdateResponse>, AppError> {
    let confirmed = ConfirmedStatus::parse(&body.status)?;

    let release = state.store.update_status(id, confirmed).await?;
    info!(
        release_id = %id,
        status = %release.status.as_str(),
        note = body.message.as_deref().unwrap_or(""),
        "Release status updated"
    );

    Ok(Json(StatusUpdateResponse {
        message: "Status updated",
        release_id: release.id,
        status: release.status.as_str().to_string(),
    }))
}

/// `GET /api/tutorial-releases/status/:status`: releases by effective
/// status.
///
/// Only `pending`, `success` and `failed` can be requested; `expired` rows
/// surface through the report, not here.
///
/// # Errors
///
/// 400 on any other status value.
pub async fn list_by_status(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<StatusListResponse>, AppError> {
    let effective = match ConfirmedStatus::parse(&status)? {
        ConfirmedStatus::Pending => EffectiveStatus::Pending,
        ConfirmedStatus::Success => EffectiveStatus::Success,
        ConfirmedStatus::Failed => EffectiveStatus::Failed,
    };

    let releases = state.store.get_by_effective_status(effective).await?;
    Ok(Json(StatusListResponse {
        status,
        count: releases.len(),
        releases,
    }))
}

/// `GET /api/tutorial-releases/pending`: condensed pending feed for polling
/// integrations.
///
/// # Errors
///
/// 500 on store failure.
pub async fn list_pending(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
) -> Result<Json<PendingResponse>, AppError> {
    let releases = state
        .store
        .get_by_effective_status(EffectiveStatus::Pending)
        .await?;

    let pending_releases: Vec<PendingRelease> = releases
        .into_iter()
        .map(|release| PendingRelease {
            id: release.id,
            client_name: release.client_name,
            client_email: release.client_email,
            client_company: release.company_name,
            created_at: release.created_at,
            status: release.status.as_str().to_string(),
        })
        .collect();

    Ok(Json(PendingResponse {
        count: pending_releases.len(),
        pending_releases,
    }))
}

/// `GET /api/tutorial-releases/stats`: aggregate counts by effective status.
///
/// # Errors
///
/// 500 on store failure.
pub async fn stats(
    _auth: ApiKeyAuth,
    State(state): State<AppState>,
) -> Result<Json<ReleaseStats>, AppError> {
    let stats = state.store.stats().await?;
    Ok(Json(stats))
}
