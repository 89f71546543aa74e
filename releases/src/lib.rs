//! # Release Portal Core
//!
//! Core domain logic for the tutorial release portal: the release lifecycle
//! state machine, durable stores, bulk ingestion and the outbound fulfillment
//! webhook.
//!
//! ## Architecture
//!
//! The crate follows a "providers as interfaces" design: all external
//! dependencies (persistence, tutorial catalog, webhook delivery, credential
//! validation) are traits in [`providers`], with concrete implementations in
//! [`stores`] and [`webhook`]. Handlers and the bulk processor depend only on
//! the traits, so the whole lifecycle is testable against in-memory fakes.
//!
//! ```text
//! HTTP shell ──▶ bulk / handlers ──▶ ReleaseStore ──▶ memory | postgres
//!                      │
//!                      └──────────▶ FulfillmentNotifier ──▶ webhook (reqwest)
//! ```
//!
//! ## Lifecycle
//!
//! A release is created `pending`, moved to `success` or `failed` by an
//! external confirmation, and lapses from `success` to `expired` once its
//! rolling validity window closes. Expiration is derived lazily on read (see
//! [`lifecycle::effective_status`]) and corrected in storage by the sweep;
//! there is no background scheduler.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod bulk;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod providers;
pub mod stores;
pub mod types;
pub mod validate;
pub mod webhook;

// Re-export main types for convenience
pub use clock::{FixedClock, ReferenceClock, SystemClock};
pub use config::{LifecycleConfig, WebhookConfig};
pub use error::{PortalError, Result};
pub use lifecycle::{ConfirmedStatus, EffectiveStatus, ReleaseStatus};
pub use types::{NewRelease, Release, ReleaseStats, ReleaseWithCreator};
