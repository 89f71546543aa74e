//! Outbound fulfillment webhook.
//!
//! [`WebhookNotifier`] POSTs a JSON description of a freshly created release
//! to the external fulfillment system. Delivery is fire-and-forget: the
//! request is bounded by the configured timeout, a failure becomes a
//! [`PortalError::Dispatch`], and callers log it and continue.
//! [`RecordingNotifier`] is the in-process stand-in for development and
//! tests.

use crate::config::WebhookConfig;
use crate::error::{PortalError, Result};
use crate::providers::FulfillmentNotifier;
use crate::types::{Release, Tutorial};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Wire payload sent to the fulfillment system.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    /// Release id.
    pub id: Uuid,
    /// Client and company details.
    pub client: ClientPayload,
    /// Resolved tutorial records, including the external catalog ids.
    pub tutorials: Vec<TutorialPayload>,
    /// Release creation instant.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Always `"pending"`: the notification announces creation, confirmation
    /// flows back through the status endpoint.
    pub status: &'static str,
}

/// Client section of the payload.
#[derive(Debug, Clone, Serialize)]
pub struct ClientPayload {
    /// Client full name.
    pub name: String,
    /// Client tax id.
    pub cpf: String,
    /// Client email.
    pub email: String,
    /// Optional phone; serialized as `null` when absent.
    pub phone: Option<String>,
    /// Company sub-section.
    pub company: CompanyPayload,
}

/// Company section of the payload.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyPayload {
    /// Company display name.
    pub name: String,
    /// Company tax id.
    pub document: String,
    /// Client's role at the company.
    pub role: String,
}

/// Tutorial section of the payload.
#[derive(Debug, Clone, Serialize)]
pub struct TutorialPayload {
    /// Catalog id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Category tag.
    pub tag: String,
    /// Identifier in the external fulfillment system.
    #[serde(rename = "idCademi")]
    pub id_cademi: i64,
}

impl WebhookPayload {
    /// Assemble the payload for `release` with its resolved `tutorials`.
    #[must_use]
    pub fn assemble(release: Release, tutorials: Vec<Tutorial>) -> Self {
        Self {
            id: release.id,
            client: ClientPayload {
                name: release.client_name,
                cpf: release.client_cpf,
                email: release.client_email,
                phone: release.client_phone,
                company: CompanyPayload {
                    name: release.company_name,
                    document: release.company_document,
                    role: release.company_role,
                },
            },
            tutorials: tutorials
                .into_iter()
                .map(|tutorial| TutorialPayload {
                    id: tutorial.id,
                    name: tutorial.name,
                    description: tutorial.description,
                    tag: tutorial.tag,
                    id_cademi: tutorial.id_cademi,
                })
                .collect(),
            created_at: release.created_at,
            status: "pending",
        }
    }
}

/// HTTP webhook notifier.
pub struct WebhookNotifier {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookNotifier {
    /// Create a notifier for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Dispatch`] if the HTTP client cannot be built.
    pub fn new(config: WebhookConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PortalError::Dispatch {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }
}

impl FulfillmentNotifier for WebhookNotifier {
    fn notify_created(
        &self,
        release: Release,
        tutorials: Vec<Tutorial>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let payload = WebhookPayload::assemble(release, tutorials);
            debug!(release_id = %payload.id, url = %self.config.url, "Dispatching webhook");

            let response = self
                .client
                .post(&self.config.url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| PortalError::Dispatch {
                    reason: format!("Request failed: {e}"),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(PortalError::Dispatch {
                    reason: format!("Webhook responded with status {status}"),
                });
            }

            info!(release_id = %payload.id, "Webhook dispatched");
            Ok(())
        })
    }
}

/// Recording notifier for development and testing.
///
/// Captures every payload instead of sending it, and can be flipped to fail
/// so callers' swallow-and-continue behavior is testable.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: RwLock<Vec<WebhookPayload>>,
    fail: RwLock<bool>,
}

impl RecordingNotifier {
    /// Create a notifier that records and succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent dispatches fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut fail) = self.fail.write() {
            *fail = failing;
        }
    }

    /// Payloads recorded so far.
    #[must_use]
    pub fn sent(&self) -> Vec<WebhookPayload> {
        self.sent.read().map_or_else(|_| Vec::new(), |sent| sent.clone())
    }
}

impl FulfillmentNotifier for RecordingNotifier {
    fn notify_created(
        &self,
        release: Release,
        tutorials: Vec<Tutorial>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.fail.read().map_or(false, |fail| *fail) {
                return Err(PortalError::Dispatch {
                    reason: "Simulated webhook failure".to_string(),
                });
            }
            let payload = WebhookPayload::assemble(release, tutorials);
            if let Ok(mut sent) = self.sent.write() {
                sent.push(payload);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::lifecycle::ReleaseStatus;

    fn release() -> Release {
        Release {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            client_name: "Ana Souza".to_string(),
            client_cpf: "12345678901".to_string(),
            client_email: "ana@cliente.com.br".to_string(),
            client_phone: None,
            company_name: "Acme Ltda".to_string(),
            company_document: "12345678000199".to_string(),
            company_role: "Compras".to_string(),
            tutorial_ids: vec!["t1".to_string()],
            status: ReleaseStatus::Pending,
            expiration_date: None,
            created_at: Utc::now(),
        }
    }

    fn tutorial() -> Tutorial {
        Tutorial {
            id: "t1".to_string(),
            name: "Basics".to_string(),
            description: "Getting started".to_string(),
            tag: "intro".to_string(),
            id_cademi: 101,
        }
    }

    #[test]
    fn test_payload_shape() {
        let payload = WebhookPayload::assemble(release(), vec![tutorial()]);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["status"], "pending");
        assert_eq!(json["client"]["company"]["document"], "12345678000199");
        assert_eq!(json["client"]["phone"], serde_json::Value::Null);
        assert_eq!(json["tutorials"][0]["idCademi"], 101);
        assert!(json.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn test_recording_notifier_records_and_fails_on_demand() {
        let notifier = RecordingNotifier::new();
        notifier
            .notify_created(release(), vec![tutorial()])
            .await
            .unwrap();
        assert_eq!(notifier.sent().len(), 1);

        notifier.set_failing(true);
        let err = notifier
            .notify_created(release(), vec![tutorial()])
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Dispatch { .. }));
        assert_eq!(notifier.sent().len(), 1);
    }
}
