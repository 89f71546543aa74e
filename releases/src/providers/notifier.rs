//! Fulfillment notifier trait.

use crate::error::Result;
use crate::types::{Release, Tutorial};
use std::future::Future;
use std::pin::Pin;

/// Outbound notification to the external fulfillment system.
///
/// Delivery is best-effort and at-most-once: callers log a failure and move
/// on, they never retry and never roll back the release that triggered it.
/// The polling query API, not this notification, is the fulfillment system's
/// source of truth.
pub trait FulfillmentNotifier: Send + Sync {
    /// Announce a freshly created release, carrying the resolved tutorial
    /// details the fulfillment system needs to act.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PortalError::Dispatch`] on network failure,
    /// timeout or a non-2xx response.
    fn notify_created(
        &self,
        release: Release,
        tutorials: Vec<Tutorial>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
