//! Bulk ingestion of release submissions.
//!
//! Spreadsheet uploads land here as an ordered list of client/company rows
//! plus one tutorial selection applied to every row. Each row is processed
//! independently: validate, persist, notify. The processor is the one place
//! in the crate that *contains* failures instead of propagating them; a bad
//! row becomes an entry in the report and the loop moves on.

use crate::error::Result;
use crate::providers::{FulfillmentNotifier, ReleaseStore, TutorialCatalog};
use crate::types::ReleaseSubmission;
use crate::validate::{validate_submission, validate_tutorial_ids};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// One row that made it into the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSuccess {
    /// Position of the row in the input, zero-based.
    pub index: usize,
    /// Id of the created release.
    pub id: Uuid,
    /// Client name, echoed back so the report reads without a lookup.
    pub client_name: String,
    /// Stored status of the created release (always `pending`).
    pub status: String,
}

/// One row that was rejected or failed to persist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    /// Position of the row in the input, zero-based.
    pub index: usize,
    /// Human-readable reason.
    pub error: String,
    /// The offending row, echoed back for correction.
    pub data: ReleaseSubmission,
}

/// Per-row outcome report for one batch.
///
/// `successful.len() + failed.len() == total` always holds; a batch is never
/// rejected wholesale for one bad row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    /// Rows created, in input order.
    pub successful: Vec<BulkSuccess>,
    /// Rows rejected, in input order.
    pub failed: Vec<BulkFailure>,
    /// Original input length.
    pub total: usize,
    /// One-line summary for display.
    pub message: String,
}

/// Process a batch of submissions for one creator.
///
/// The tutorial selection is validated once up front; a bad selection fails
/// the whole request because no row could possibly succeed. After that,
/// every row runs validate → create → notify on its own, sequentially so
/// webhook order matches input order. Webhook failures are logged and do not
/// fail the row.
///
/// # Errors
///
/// Returns [`PortalError::Validation`] only for an empty or blank tutorial
/// selection. Row-level errors land in the report, never here.
pub async fn process(
    rows: Vec<ReleaseSubmission>,
    tutorial_ids: Vec<String>,
    user_id: Uuid,
    store: &dyn ReleaseStore,
    catalog: &dyn TutorialCatalog,
    notifier: &dyn FulfillmentNotifier,
) -> Result<BulkReport> {
    validate_tutorial_ids(&tutorial_ids)?;

    let total = rows.len();
    let mut successful = Vec::new();
    let mut failed = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        match ingest_row(&row, tutorial_ids.clone(), user_id, store, catalog, notifier).await {
            Ok(success) => successful.push(BulkSuccess { index, ..success }),
            Err(error) => {
                warn!(index, %error, "Bulk row rejected");
                failed.push(BulkFailure {
                    index,
                    error: error.to_string(),
                    data: row,
                });
            }
        }
    }

    let message = format!(
        "{} of {} releases created ({} failed)",
        successful.len(),
        total,
        failed.len()
    );
    info!(
        created = successful.len(),
        rejected = failed.len(),
        total,
        "Bulk ingestion finished"
    );

    Ok(BulkReport {
        successful,
        failed,
        total,
        message,
    })
}

async fn ingest_row(
    row: &ReleaseSubmission,
    tutorial_ids: Vec<String>,
    user_id: Uuid,
    store: &dyn ReleaseStore,
    catalog: &dyn TutorialCatalog,
    notifier: &dyn FulfillmentNotifier,
) -> Result<BulkSuccess> {
    validate_submission(row)?;

    let release = store
        .create(row.clone().into_new_release(tutorial_ids, user_id))
        .await?;

    match catalog.get_by_ids(release.tutorial_ids.clone()).await {
        Ok(tutorials) => {
            if let Err(error) = notifier.notify_created(release.clone(), tutorials).await {
                warn!(release_id = %release.id, %error, "Webhook dispatch failed, release kept");
            }
        }
        Err(error) => {
            warn!(release_id = %release.id, %error, "Tutorial lookup for webhook failed, release kept");
        }
    }

    Ok(BulkSuccess {
        index: 0,
        id: release.id,
        client_name: release.client_name,
        status: release.status.as_str().to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::clock::{FixedClock, ReferenceClock};
    use crate::error::PortalError;
    use crate::config::LifecycleConfig;
    use crate::stores::{MemoryCatalog, MemoryReleaseStore};
    use crate::types::Tutorial;
    use crate::webhook::RecordingNotifier;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn store() -> MemoryReleaseStore {
        let clock: Arc<dyn ReferenceClock> =
            Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()));
        MemoryReleaseStore::new(clock, LifecycleConfig::default())
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![Tutorial {
            id: "t1".to_string(),
            name: "Basics".to_string(),
            description: "Getting started".to_string(),
            tag: "intro".to_string(),
            id_cademi: 101,
        }])
    }

    fn row(name: &str, email: &str) -> ReleaseSubmission {
        ReleaseSubmission {
            client_name: name.to_string(),
            client_cpf: "12345678901".to_string(),
            client_email: email.to_string(),
            client_phone: None,
            company_name: "Acme Ltda".to_string(),
            company_document: "12345678000199".to_string(),
            company_role: "Compras".to_string(),
        }
    }

    #[tokio::test]
    async fn test_partial_batch_contains_failures() {
        let store = store();
        let catalog = catalog();
        let notifier = RecordingNotifier::new();
        let rows = vec![
            row("Ana", "ana@cliente.com.br"),
            row("Bruno", "not-an-email"),
            row("Carla", "carla@cliente.com.br"),
        ];

        let report = process(
            rows,
            vec!["t1".to_string()],
            Uuid::new_v4(),
            &store,
            &catalog,
            &notifier,
        )
        .await
        .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.successful.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].index, 1);
        assert_eq!(report.failed[0].data.client_name, "Bruno");
        assert_eq!(report.successful[0].index, 0);
        assert_eq!(report.successful[1].index, 2);
        assert_eq!(report.successful[0].status, "pending");
        // One webhook per created row, in input order.
        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].client.name, "Ana");
        assert_eq!(sent[1].client.name, "Carla");
    }

    #[tokio::test]
    async fn test_webhook_failure_does_not_fail_rows() {
        let store = store();
        let catalog = catalog();
        let notifier = RecordingNotifier::new();
        notifier.set_failing(true);

        let report = process(
            vec![row("Ana", "ana@cliente.com.br")],
            vec!["t1".to_string()],
            Uuid::new_v4(),
            &store,
            &catalog,
            &notifier,
        )
        .await
        .unwrap();

        assert_eq!(report.successful.len(), 1);
        assert!(report.failed.is_empty());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_empty_tutorial_selection_rejects_batch() {
        let store = store();
        let catalog = catalog();
        let notifier = RecordingNotifier::new();

        let err = process(
            vec![row("Ana", "ana@cliente.com.br")],
            Vec::new(),
            Uuid::new_v4(),
            &store,
            &catalog,
            &notifier,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PortalError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_counts_always_cover_input() {
        let store = store();
        let catalog = catalog();
        let notifier = RecordingNotifier::new();
        let rows: Vec<_> = (0..5)
            .map(|i| {
                if i % 2 == 0 {
                    row("Ana", "ana@cliente.com.br")
                } else {
                    row("", "ana@cliente.com.br")
                }
            })
            .collect();

        let report = process(
            rows,
            vec!["t1".to_string()],
            Uuid::new_v4(),
            &store,
            &catalog,
            &notifier,
        )
        .await
        .unwrap();

        assert_eq!(report.successful.len() + report.failed.len(), report.total);
        assert_eq!(report.total, 5);
        assert_eq!(report.message, "3 of 5 releases created (2 failed)");
    }
}
