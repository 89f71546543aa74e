//! Portal configuration.
//!
//! Configuration values should be provided by the application, not hardcoded.

use chrono_tz::Tz;
use std::time::Duration;

/// Lifecycle configuration.
///
/// Controls the rolling validity window applied when a release is confirmed
/// as `success`.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Validity window length in wall-clock days.
    ///
    /// Default: 90 days
    pub validity_days: u64,

    /// Reference time zone for the wall-clock day arithmetic.
    ///
    /// Timestamps are stored and compared as UTC; only the "+N days"
    /// computation happens in this zone, so the window always closes at the
    /// same local wall-clock time regardless of DST shifts.
    ///
    /// Default: `America/Sao_Paulo`
    pub reference_zone: Tz,
}

impl LifecycleConfig {
    /// Create a new lifecycle configuration with defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            validity_days: 90,
            reference_zone: chrono_tz::America::Sao_Paulo,
        }
    }

    /// Set the validity window length in days.
    #[must_use]
    pub const fn with_validity_days(mut self, days: u64) -> Self {
        self.validity_days = days;
        self
    }

    /// Set the reference time zone.
    #[must_use]
    pub const fn with_reference_zone(mut self, zone: Tz) -> Self {
        self.reference_zone = zone;
        self
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outbound webhook configuration.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Fulfillment system endpoint receiving release notifications.
    pub url: String,

    /// Network timeout for a single dispatch attempt.
    ///
    /// A timed-out dispatch counts as a failed dispatch; there are no
    /// retries.
    ///
    /// Default: 10 seconds
    pub timeout: Duration,
}

impl WebhookConfig {
    /// Create a new webhook configuration.
    ///
    /// # Arguments
    ///
    /// * `url` - Fulfillment endpoint (e.g., "https://wf.example.com/webhook/cadastro")
    #[must_use]
    pub const fn new(url: String) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(10),
        }
    }

    /// Set the dispatch timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_config_builder() {
        let config = LifecycleConfig::new()
            .with_validity_days(30)
            .with_reference_zone(chrono_tz::UTC);

        assert_eq!(config.validity_days, 30);
        assert_eq!(config.reference_zone, chrono_tz::UTC);
    }

    #[test]
    fn test_lifecycle_config_defaults() {
        let config = LifecycleConfig::default();
        assert_eq!(config.validity_days, 90);
        assert_eq!(config.reference_zone, chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn test_webhook_config_builder() {
        let config = WebhookConfig::new("https://wf.example.com/hook".to_string())
            .with_timeout(Duration::from_secs(3));

        assert_eq!(config.url, "https://wf.example.com/hook");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }
}
