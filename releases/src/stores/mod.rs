//! Store implementations.
//!
//! Two backings for the provider traits:
//! - [`memory`]: `RwLock`'d in-process tables; the default deployment and
//!   the backing for every test.
//! - [`postgres`]: sqlx-backed persistence, selected by the server when a
//!   database URL is configured.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCatalog, MemoryJobRoles, MemoryReleaseStore, StaticSessions};
pub use postgres::{PostgresCatalog, PostgresJobRoles, PostgresReleaseStore};
