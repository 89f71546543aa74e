//! Custom Axum extractors.
//!
//! The portal has two callers with two authentication schemes:
//! - [`SessionUser`]: employees using the portal UI, identified by a bearer
//!   session token resolved through the `SessionValidator` provider
//! - [`ApiKeyAuth`]: the external automation system polling the lifecycle
//!   query API with the shared key, via `x-api-key` or a bearer token
//!
//! Both are `FromRequestParts` extractors, so a handler opts into a scheme
//! simply by naming the extractor in its signature.
//!
//! # Examples
//!
//! ```ignore
//! async fn create_release(
//!     user: SessionUser,
//!     State(state): State<AppState>,
//!     Json(body): Json<CreateReleaseRequest>,
//! ) -> Result<Json<Release>, AppError> {
//!     // `user.0` is the resolved Employee
//! }
//! ```

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use release_portal_releases::types::Employee;
use release_portal_releases::PortalError;

/// Header carrying the shared automation key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// The employee behind a valid portal session.
///
/// Rejects with 401 when the `Authorization: Bearer` token is absent or does
/// not resolve to an employee.
#[derive(Debug, Clone)]
pub struct SessionUser(pub Employee);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(PortalError::SessionRequired)?;

        let employee = state
            .sessions
            .resolve(token)
            .await
            .ok_or(PortalError::SessionRequired)?;

        Ok(Self(employee))
    }
}

/// Proof that the caller presented the valid shared API key.
///
/// Accepts the key in the `x-api-key` header or as a bearer token, matching
/// what existing automation integrations send. Rejects with 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct ApiKeyAuth;

#[async_trait]
impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .or_else(|| bearer_token(parts));

        match presented {
            Some(key) if state.credentials.validate(&key) => Ok(Self),
            _ => Err(PortalError::ApiKeyInvalid.into()),
        }
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_bearer_token_extraction() {
        let req = Request::builder()
            .header(header::AUTHORIZATION, "Bearer session-abc")
            .body(())
            .expect("Valid request");
        let (parts, ()) = req.into_parts();

        assert_eq!(bearer_token(&parts), Some("session-abc".to_string()));
    }

    #[test]
    fn test_bearer_token_requires_scheme() {
        let req = Request::builder()
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(())
            .expect("Valid request");
        let (parts, ()) = req.into_parts();

        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_bearer_token_absent() {
        let req = Request::builder().body(()).expect("Valid request");
        let (parts, ()) = req.into_parts();

        assert_eq!(bearer_token(&parts), None);
    }
}
