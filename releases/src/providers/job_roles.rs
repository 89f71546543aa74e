//! Job role lookup trait.

use crate::error::Result;
use crate::types::{JobRole, RoleType};
use std::future::Future;
use std::pin::Pin;

/// Lookup of department / client-role enumerations consumed by registration
/// forms and the bulk importer.
pub trait JobRoleRepository: Send + Sync {
    /// Active roles, optionally restricted to one enumeration, ordered by
    /// `sort_order` then name.
    ///
    /// # Errors
    ///
    /// Returns error if the lookup fails.
    fn get_active(
        &self,
        role_type: Option<RoleType>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<JobRole>>> + Send + '_>>;
}
