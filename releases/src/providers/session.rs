//! Session validation trait.
//!
//! Authentication mechanics (passwords, cookies, verification emails) live
//! outside this core; the HTTP shell only needs "which employee does this
//! token belong to". Deployments plug in their real session backend here.

use crate::types::Employee;
use std::future::Future;
use std::pin::Pin;

/// Resolves an employee session token to its owner.
pub trait SessionValidator: Send + Sync {
    /// Returns the employee the token belongs to, or `None` if the token is
    /// unknown or expired.
    fn resolve(
        &self,
        token: String,
    ) -> Pin<Box<dyn Future<Output = Option<Employee>> + Send + '_>>;
}
