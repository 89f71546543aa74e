//! Portal providers.
//!
//! This module defines traits for all external dependencies of the release
//! lifecycle. Providers are **interfaces**, not implementations: the bulk
//! processor and the HTTP shell depend on these traits, and the runtime picks
//! concrete implementations.
//!
//! This enables:
//! - **Testing**: in-memory, deterministic fakes
//! - **Production**: PostgreSQL persistence, real webhook delivery
//! - **Swapping credentials**: per-caller keys without touching call sites
//!
//! Async trait methods return `Pin<Box<dyn Future>>` so every provider stays
//! object-safe and can be shared as `Arc<dyn …>` inside the HTTP state.

pub mod catalog;
pub mod credentials;
pub mod job_roles;
pub mod notifier;
pub mod session;
pub mod store;

pub use catalog::TutorialCatalog;
pub use credentials::{CredentialValidator, StaticApiKey};
pub use job_roles::JobRoleRepository;
pub use notifier::FulfillmentNotifier;
pub use session::SessionValidator;
pub use store::{ReleaseStore, ReportFilter};
