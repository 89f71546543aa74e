//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by domain.

pub mod catalog;
pub mod health;
pub mod lifecycle;
pub mod releases;

// Re-export common handler utilities
pub use health::health_check;
