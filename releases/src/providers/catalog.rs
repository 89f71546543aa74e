//! Tutorial catalog trait.

use crate::error::Result;
use crate::types::Tutorial;
use std::future::Future;
use std::pin::Pin;

/// Read-only view of the tutorial catalog.
///
/// The catalog is owned by a separate collaborator; this core only resolves
/// tutorial details for forms and for the webhook payload.
pub trait TutorialCatalog: Send + Sync {
    /// All tutorials.
    ///
    /// # Errors
    ///
    /// Returns error if the lookup fails.
    fn get_all(&self) -> Pin<Box<dyn Future<Output = Result<Vec<Tutorial>>> + Send + '_>>;

    /// Tutorials matching `ids`, in catalog order. Unknown ids are skipped,
    /// not errors; the fulfillment system receives whatever resolved.
    ///
    /// # Errors
    ///
    /// Returns error if the lookup fails.
    fn get_by_ids(
        &self,
        ids: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Tutorial>>> + Send + '_>>;
}
