//! Error types for release lifecycle operations.

use thiserror::Error;

/// Result type alias for portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;

/// Error taxonomy for the release portal core.
///
/// Each variant corresponds to a distinct propagation policy (see the bulk
/// processor, which contains `Validation` and `Storage` per row instead of
/// propagating them, and the webhook callers, which log and swallow
/// `Dispatch`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortalError {
    // ═══════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════
    /// A release field is missing or malformed.
    #[error("{field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// Field-level message suitable for the caller.
        message: String,
    },

    /// A status value outside `{pending, success, failed}` was submitted.
    #[error("Invalid status '{value}'. Use: pending, success, failed")]
    InvalidStatus {
        /// The rejected value.
        value: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Auth Errors
    // ═══════════════════════════════════════════════════════════
    /// Missing or incorrect shared API key.
    #[error("Invalid or missing API key")]
    ApiKeyInvalid,

    /// No valid employee session accompanies the request.
    #[error("Not authorized")]
    SessionRequired,

    // ═══════════════════════════════════════════════════════════
    // Lookup Errors
    // ═══════════════════════════════════════════════════════════
    /// The referenced record does not exist.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Resource kind ("release", "user", ...).
        resource: String,
        /// Identifier that failed to resolve.
        id: String,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════
    /// Webhook delivery failed (network, timeout or non-2xx response).
    ///
    /// At-most-once semantics: callers log this and continue, they never
    /// retry and never roll back the release that triggered the dispatch.
    #[error("Webhook dispatch failed: {reason}")]
    Dispatch {
        /// Human-readable failure cause.
        reason: String,
    },

    /// Underlying store failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PortalError {
    /// Build a validation error for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a not-found error for `resource` with `id`.
    pub fn not_found(resource: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Returns `true` if this error is due to invalid caller input.
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidStatus { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = PortalError::validation("company_document", "CNPJ is required");
        assert_eq!(err.to_string(), "company_document: CNPJ is required");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_invalid_status_display() {
        let err = PortalError::InvalidStatus {
            value: "done".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid status 'done'. Use: pending, success, failed"
        );
    }

    #[test]
    fn test_dispatch_is_not_user_error() {
        let err = PortalError::Dispatch {
            reason: "timeout".to_string(),
        };
        assert!(!err.is_user_error());
    }
}
