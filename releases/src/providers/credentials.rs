//! Credential validation for automation callers.
//!
//! The query API is gated by a shared secret rather than an employee
//! session. Validation is behind a trait so deployments can swap the single
//! static key for scoped per-caller credentials without changing call sites.

use constant_time_eq::constant_time_eq;

/// Validates the credential presented by an external automation caller.
pub trait CredentialValidator: Send + Sync {
    /// Returns `true` if `key` grants access to the lifecycle query API.
    fn validate(&self, key: &str) -> bool;
}

/// Single static shared key, compared in constant time.
///
/// The key comes from configuration; it is never compiled into the binary.
#[derive(Clone)]
pub struct StaticApiKey {
    key: String,
}

impl StaticApiKey {
    /// Create a validator for `key`.
    #[must_use]
    pub const fn new(key: String) -> Self {
        Self { key }
    }
}

impl std::fmt::Debug for StaticApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never log the secret itself.
        f.debug_struct("StaticApiKey").finish_non_exhaustive()
    }
}

impl CredentialValidator for StaticApiKey {
    fn validate(&self, key: &str) -> bool {
        constant_time_eq(self.key.as_bytes(), key.as_bytes())
    }
}
