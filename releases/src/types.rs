//! Domain data models.
//!
//! Serialized field names follow the portal's existing JSON wire format
//! (camelCase), so external consumers keep working unchanged.

use crate::lifecycle::ReleaseStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A release: a client/company being granted access to a set of tutorials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Opaque unique id, generated at creation.
    pub id: Uuid,
    /// Creator (employee) id. Immutable after creation.
    pub user_id: Uuid,
    /// Client full name.
    pub client_name: String,
    /// Client tax id (11-digit person id).
    pub client_cpf: String,
    /// Client email address.
    pub client_email: String,
    /// Optional client phone.
    pub client_phone: Option<String>,
    /// Company display name.
    pub company_name: String,
    /// Company tax id (14-digit organization id).
    pub company_document: String,
    /// Client's role at the company.
    pub company_role: String,
    /// Ordered, non-empty set of tutorial ids to grant.
    pub tutorial_ids: Vec<String>,
    /// Stored status. Read paths must derive the effective status instead of
    /// trusting this column (see [`crate::lifecycle::effective_status`]).
    pub status: ReleaseStatus,
    /// Present iff the stored status is `success` and the validity window is
    /// still open.
    pub expiration_date: Option<DateTime<Utc>>,
    /// Set once at creation, immutable.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a release. Status and timestamps are owned by the
/// store, never by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelease {
    /// Creator (employee) id.
    pub user_id: Uuid,
    /// Client full name.
    pub client_name: String,
    /// Client tax id (11-digit person id).
    pub client_cpf: String,
    /// Client email address.
    pub client_email: String,
    /// Optional client phone.
    pub client_phone: Option<String>,
    /// Company display name.
    pub company_name: String,
    /// Company tax id (14-digit organization id).
    pub company_document: String,
    /// Client's role at the company.
    pub company_role: String,
    /// Ordered, non-empty set of tutorial ids to grant.
    pub tutorial_ids: Vec<String>,
}

/// A raw client/company record as submitted by a form or a bulk row, before
/// validation and before it is stamped with its creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSubmission {
    /// Client full name.
    pub client_name: String,
    /// Client tax id (11-digit person id).
    pub client_cpf: String,
    /// Client email address.
    pub client_email: String,
    /// Optional client phone.
    #[serde(default)]
    pub client_phone: Option<String>,
    /// Company display name.
    pub company_name: String,
    /// Company tax id (14-digit organization id).
    pub company_document: String,
    /// Client's role at the company.
    pub company_role: String,
}

impl ReleaseSubmission {
    /// Stamp the submission with its tutorials and creator.
    #[must_use]
    pub fn into_new_release(self, tutorial_ids: Vec<String>, user_id: Uuid) -> NewRelease {
        NewRelease {
            user_id,
            client_name: self.client_name,
            client_cpf: self.client_cpf,
            client_email: self.client_email,
            client_phone: self.client_phone,
            company_name: self.company_name,
            company_document: self.company_document,
            company_role: self.company_role,
            tutorial_ids,
        }
    }
}

/// A release joined with its creator, as returned by the "list all" and
/// report read paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseWithCreator {
    /// The release row.
    #[serde(flatten)]
    pub release: Release,
    /// The employee who submitted it.
    pub user: Employee,
}

/// Portal employee (release creator).
///
/// Authentication mechanics live outside this core; only the identity data
/// needed for the creator join and session resolution is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Employee id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Corporate email.
    pub email: String,
    /// Department label.
    pub department: String,
}

/// Reference entry of the tutorial catalog. Read-only from this core's
/// perspective; owned by a separate catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tutorial {
    /// Catalog id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Category tag.
    pub tag: String,
    /// Identifier in the external fulfillment system.
    pub id_cademi: i64,
}

/// Department / client-role lookup entry consumed by forms and the bulk
/// processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRole {
    /// Lookup id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Which enumeration this entry belongs to.
    pub role_type: RoleType,
    /// Sort order within its enumeration.
    pub sort_order: i32,
    /// Soft-delete flag; inactive entries are hidden from lookups.
    pub active: bool,
}

/// Job role enumeration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Internal department of the employee.
    Department,
    /// Role of the client at their company.
    ClientRole,
}

/// Aggregate release counts by effective status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseStats {
    /// All releases.
    pub total: u64,
    /// Effectively pending.
    pub pending: u64,
    /// Effectively successful (window still open).
    pub success: u64,
    /// Failed.
    pub failed: u64,
    /// Effectively expired (stored `expired` plus lapsed `success`).
    pub expired: u64,
    /// `round(success / total * 100)`, `0` when there are no releases.
    pub success_rate: u64,
}

impl ReleaseStats {
    /// Compute the success rate from the raw counters.
    #[must_use]
    pub fn with_rate(mut self) -> Self {
        self.success_rate = if self.total == 0 {
            0
        } else {
            // Round to nearest (47.5% -> 48); integer division would
            // truncate.
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                ((self.success as f64 / self.total as f64) * 100.0).round() as u64
            }
        };
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    fn stats(total: u64, success: u64) -> ReleaseStats {
        ReleaseStats {
            total,
            pending: 0,
            success,
            failed: 0,
            expired: 0,
            success_rate: 0,
        }
        .with_rate()
    }

    #[test]
    fn test_success_rate_rounding() {
        assert_eq!(stats(0, 0).success_rate, 0);
        assert_eq!(stats(3, 2).success_rate, 67);
        assert_eq!(stats(3, 1).success_rate, 33);
        assert_eq!(stats(4, 4).success_rate, 100);
    }

    #[test]
    fn test_release_serializes_camel_case() {
        let release = Release {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            client_name: "Ana".to_string(),
            client_cpf: "12345678901".to_string(),
            client_email: "ana@example.com".to_string(),
            client_phone: None,
            company_name: "Acme".to_string(),
            company_document: "12345678000199".to_string(),
            company_role: "Buyer".to_string(),
            tutorial_ids: vec!["t1".to_string()],
            status: ReleaseStatus::Pending,
            expiration_date: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&release).unwrap();
        assert!(json.get("clientName").is_some());
        assert!(json.get("companyDocument").is_some());
        assert_eq!(json["status"], "pending");
    }
}
