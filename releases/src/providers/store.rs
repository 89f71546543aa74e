//! Release store trait.

use crate::error::Result;
use crate::lifecycle::{ConfirmedStatus, EffectiveStatus};
use crate::types::{NewRelease, Release, ReleaseStats, ReleaseWithCreator};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

/// Optional filters for the report read path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Restrict to one creator.
    pub user_id: Option<Uuid>,
    /// Restrict to one effective status (`None` means all).
    pub status: Option<EffectiveStatus>,
}

/// Durable persistence for release records.
///
/// The store is the *only* place allowed to mutate `status` and
/// `expiration_date`; every transition goes through the rules in
/// [`crate::lifecycle`]. Time-aware queries (`get_by_effective_status`,
/// `stats`) derive the effective status with the reference clock instead of
/// trusting the stored column.
pub trait ReleaseStore: Send + Sync {
    /// Insert a new release with status `pending` and no expiration.
    ///
    /// Input is assumed schema-valid; run
    /// [`crate::validate::validate_submission`] first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PortalError::Storage`] if the write fails.
    fn create(
        &self,
        release: NewRelease,
    ) -> Pin<Box<dyn Future<Output = Result<Release>> + Send + '_>>;

    /// All releases submitted by `user_id`, newest-first.
    ///
    /// Runs [`Self::sweep_expired`] first, like the other list reads, so a
    /// lapsed `success` row never leaks a stale expiration.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_by_user(
        &self,
        user_id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Release>>> + Send + '_>>;

    /// All releases joined with their creator, newest-first.
    ///
    /// Runs [`Self::sweep_expired`] first so stored and effective status
    /// cannot diverge for more than one read cycle. Rows whose creator record
    /// was deleted are silently dropped, not surfaced as errors.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_all(&self)
        -> Pin<Box<dyn Future<Output = Result<Vec<ReleaseWithCreator>>> + Send + '_>>;

    /// Apply an external confirmation to one release.
    ///
    /// Sets or clears the expiration per the transition rule and returns the
    /// updated row. Last-write-wins under concurrent confirmations.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PortalError::NotFound`] if `id` does not
    /// exist.
    fn update_status(
        &self,
        id: Uuid,
        status: ConfirmedStatus,
    ) -> Pin<Box<dyn Future<Output = Result<Release>> + Send + '_>>;

    /// Releases whose *effective* status equals `status`, newest-first.
    ///
    /// For `success` and `expired` this is a time-aware query against the
    /// expiration column, not a raw status match.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_by_effective_status(
        &self,
        status: EffectiveStatus,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Release>>> + Send + '_>>;

    /// Aggregate counts by effective status.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn stats(&self) -> Pin<Box<dyn Future<Output = Result<ReleaseStats>> + Send + '_>>;

    /// Rewrite stored `success` rows whose window has closed to
    /// `expired` / no expiration.
    ///
    /// Idempotent: a second run right after the first changes nothing.
    /// Returns the number of rows rewritten.
    ///
    /// # Errors
    ///
    /// Returns error if the rewrite fails.
    fn sweep_expired(&self) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + '_>>;

    /// Filterable creator-joined rows feeding the spreadsheet report.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    fn get_for_report(
        &self,
        filter: ReportFilter,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReleaseWithCreator>>> + Send + '_>>;
}
