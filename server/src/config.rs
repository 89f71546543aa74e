//! Configuration management for the portal server.
//!
//! Loads configuration from environment variables with sensible defaults.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;
use uuid::Uuid;

/// Development fallback for the automation API key.
///
/// `main` logs a warning when the server starts with this value.
pub const DEV_API_KEY: &str = "dev-api-key";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application server configuration
    pub server: ServerConfig,
    /// Release lifecycle configuration
    pub lifecycle: LifecycleSettings,
    /// Outbound webhook configuration
    pub webhook: WebhookSettings,
    /// Portal session / credential configuration
    pub auth: AuthSettings,
    /// `PostgreSQL` connection URL; absent means the in-memory store
    pub database_url: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Release lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleSettings {
    /// Validity window in wall-clock days (default: 90)
    pub validity_days: u64,
    /// Reference time zone for the window arithmetic
    pub reference_zone: Tz,
}

/// Outbound webhook settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Fulfillment endpoint; absent means dispatches are recorded in-process
    pub url: Option<String>,
    /// Timeout for a single dispatch attempt, in seconds (default: 10)
    pub timeout_secs: u64,
}

/// Session and credential settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Shared key for the automation query API
    pub api_key: String,
    /// Static bearer token accepted as a portal session
    pub session_token: String,
    /// Identity the session token resolves to
    pub employee_id: Uuid,
    /// Employee display name
    pub employee_name: String,
    /// Employee email
    pub employee_email: String,
    /// Employee department
    pub employee_department: String,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            },
            lifecycle: LifecycleSettings {
                validity_days: env::var("RELEASE_VALIDITY_DAYS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(90),
                reference_zone: env::var("REFERENCE_TIMEZONE")
                    .ok()
                    .and_then(|s| match s.parse() {
                        Ok(zone) => Some(zone),
                        Err(_) => {
                            warn!(zone = %s, "Unknown REFERENCE_TIMEZONE, using America/Sao_Paulo");
                            None
                        }
                    })
                    .unwrap_or(chrono_tz::America::Sao_Paulo),
            },
            webhook: WebhookSettings {
                url: env::var("WEBHOOK_URL").ok(),
                timeout_secs: env::var("WEBHOOK_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            },
            auth: AuthSettings {
                api_key: env::var("API_KEY").unwrap_or_else(|_| DEV_API_KEY.to_string()),
                session_token: env::var("SESSION_TOKEN")
                    .unwrap_or_else(|_| "dev-session-token".to_string()),
                employee_id: env::var("PORTAL_EMPLOYEE_ID")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(Uuid::new_v4),
                employee_name: env::var("PORTAL_EMPLOYEE_NAME")
                    .unwrap_or_else(|_| "Portal Operator".to_string()),
                employee_email: env::var("PORTAL_EMPLOYEE_EMAIL")
                    .unwrap_or_else(|_| "operator@portal.local".to_string()),
                employee_department: env::var("PORTAL_EMPLOYEE_DEPARTMENT")
                    .unwrap_or_else(|_| "Operations".to_string()),
            },
            database_url: env::var("DATABASE_URL").ok(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        // Only checks fields no test environment is expected to override.
        let config = Config::from_env();
        assert_eq!(config.lifecycle.validity_days, 90);
        assert_eq!(config.webhook.timeout_secs, 10);
    }
}
