//! Release submission validation.
//!
//! Field checks mirror the portal's registration form: non-empty names and
//! role, minimum lengths for the two tax ids, a well-formed email, and a
//! non-empty tutorial selection. Validation runs before the store is touched;
//! the store itself assumes schema-valid input.

use crate::error::{PortalError, Result};
use crate::types::ReleaseSubmission;

/// Minimum digits of a person tax id (CPF).
pub const CPF_MIN_LEN: usize = 11;

/// Minimum digits of an organization tax id (CNPJ).
pub const CNPJ_MIN_LEN: usize = 14;

/// Validate a single release submission.
///
/// Checks fields in declaration order and fails on the first offending one,
/// so callers always get a single field-level message.
///
/// # Errors
///
/// Returns [`PortalError::Validation`] naming the offending field.
pub fn validate_submission(submission: &ReleaseSubmission) -> Result<()> {
    require_non_empty("client_name", &submission.client_name)?;

    if submission.client_cpf.trim().len() < CPF_MIN_LEN {
        return Err(PortalError::validation(
            "client_cpf",
            format!("CPF must have at least {CPF_MIN_LEN} digits"),
        ));
    }

    if !is_valid_email(&submission.client_email) {
        return Err(PortalError::validation(
            "client_email",
            "Invalid email address",
        ));
    }

    require_non_empty("company_name", &submission.company_name)?;

    if submission.company_document.trim().len() < CNPJ_MIN_LEN {
        return Err(PortalError::validation("company_document", "CNPJ is required"));
    }

    require_non_empty("company_role", &submission.company_role)?;

    Ok(())
}

/// Validate the tutorial selection shared by one or many submissions.
///
/// # Errors
///
/// Returns [`PortalError::Validation`] if the selection is empty or contains
/// a blank id.
pub fn validate_tutorial_ids(tutorial_ids: &[String]) -> Result<()> {
    if tutorial_ids.is_empty() {
        return Err(PortalError::validation(
            "tutorial_ids",
            "Select at least one tutorial",
        ));
    }
    if tutorial_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(PortalError::validation(
            "tutorial_ids",
            "Tutorial ids must be non-empty",
        ));
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PortalError::validation(
            field,
            format!("{field} is required"),
        ));
    }
    Ok(())
}

/// Basic email format check: exactly one `@`, non-empty local and dotted
/// domain parts, conservative character set.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if !domain.contains('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local)
        && domain.chars().all(valid_domain)
        && domain.split('.').all(|part| !part.is_empty())
}
