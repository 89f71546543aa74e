//! Axum HTTP layer for the tutorial release portal.
//!
//! This crate is the imperative shell around `release-portal-releases`: it
//! parses requests, enforces the two authentication schemes and maps domain
//! errors to HTTP responses. All business rules live in the core crate;
//! handlers here only translate.
//!
//! # Request Flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extractors** authenticate it (`SessionUser` for the employee portal,
//!    `ApiKeyAuth` for the automation query API)
//! 3. The handler calls the core through the provider traits in `AppState`
//! 4. **`AppError`** converts any failure into a JSON error response
//!
//! # Example
//!
//! ```ignore
//! use release_portal_web::{router, AppState};
//!
//! let app = router(app_state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{ApiKeyAuth, SessionUser};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};
pub use router::router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
