//! Application state shared across HTTP handlers.
//!
//! All collaborators are trait objects, so the same router serves the
//! in-memory development setup and the PostgreSQL production setup without
//! code changes.

use release_portal_releases::providers::{
    CredentialValidator, FulfillmentNotifier, JobRoleRepository, ReleaseStore, SessionValidator,
    TutorialCatalog,
};
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Release persistence.
    pub store: Arc<dyn ReleaseStore>,
    /// Tutorial catalog lookups.
    pub catalog: Arc<dyn TutorialCatalog>,
    /// Outbound fulfillment notification.
    pub notifier: Arc<dyn FulfillmentNotifier>,
    /// Employee session resolution.
    pub sessions: Arc<dyn SessionValidator>,
    /// Shared API key validation for the automation query API.
    pub credentials: Arc<dyn CredentialValidator>,
    /// Department / client-role lookups.
    pub job_roles: Arc<dyn JobRoleRepository>,
}

impl AppState {
    /// Assemble the state from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn ReleaseStore>,
        catalog: Arc<dyn TutorialCatalog>,
        notifier: Arc<dyn FulfillmentNotifier>,
        sessions: Arc<dyn SessionValidator>,
        credentials: Arc<dyn CredentialValidator>,
        job_roles: Arc<dyn JobRoleRepository>,
    ) -> Self {
        Self {
            store,
            catalog,
            notifier,
            sessions,
            credentials,
            job_roles,
        }
    }
}
