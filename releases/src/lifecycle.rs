//! Release lifecycle state machine.
//!
//! Pure logic only: given the current time and a release's stored
//! status/expiration, decide what its *effective* status is, and what to
//! write when an external confirmation arrives. Stores call into this module
//! for every transition so stored and derived state can never disagree about
//! the rules, only about freshness (the sweep closes that gap).
//!
//! ```text
//!            confirmation(success)              sweep / lapse
//! pending ──────────────────────────▶ success ───────────────▶ expired
//!    │                                   ▲ │
//!    │ confirmation(failed)              └─┘ re-confirmation (idempotent)
//!    ▼
//! failed  (terminal on the modeled paths)
//! ```
//!
//! Re-sending a confirmation re-applies the same rule (last-write-wins, no
//! versioning): the orchestrator is the single writer and its calls are
//! expected to be idempotent in practice. The system itself never moves a
//! release back to `pending`; only an explicit confirmation can.

use crate::config::LifecycleConfig;
use crate::error::PortalError;
use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stored status of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseStatus {
    /// Created, awaiting external confirmation.
    Pending,
    /// Confirmed by the fulfillment system; validity window open.
    Success,
    /// Confirmed as failed. Terminal on the modeled paths.
    Failed,
    /// Validity window closed (written by the sweep).
    Expired,
}

impl ReleaseStatus {
    /// Wire representation (`pending`, `success`, `failed`, `expired`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "expired" => Ok(Self::Expired),
            other => Err(PortalError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Status value an external confirmation may carry.
///
/// `expired` is deliberately absent: it is derived from time, never
/// submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmedStatus {
    /// Re-queue the release.
    Pending,
    /// Fulfillment succeeded; open the validity window.
    Success,
    /// Fulfillment failed.
    Failed,
}

impl ConfirmedStatus {
    /// Parse a confirmation value, rejecting everything outside
    /// `{pending, success, failed}`.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidStatus`] for any other input, including
    /// `expired`.
    pub fn parse(value: &str) -> Result<Self, PortalError> {
        match value {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(PortalError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ConfirmedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Status as derived at read time, accounting for lapsed expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    /// Awaiting confirmation.
    Pending,
    /// Confirmed and still within the validity window.
    Success,
    /// Confirmed as failed.
    Failed,
    /// Window closed, whether or not the sweep has caught up.
    Expired,
}

impl EffectiveStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectiveStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "expired" => Ok(Self::Expired),
            other => Err(PortalError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Derive the effective status of a release.
///
/// A stored `success` whose expiration is missing or not in the future is
/// effectively `expired` even before the sweep rewrites it; every read path
/// must use this derivation rather than trust the stored column.
#[must_use]
pub fn effective_status(
    stored: ReleaseStatus,
    expiration_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> EffectiveStatus {
    match stored {
        ReleaseStatus::Pending => EffectiveStatus::Pending,
        ReleaseStatus::Failed => EffectiveStatus::Failed,
        ReleaseStatus::Expired => EffectiveStatus::Expired,
        ReleaseStatus::Success => match expiration_date {
            Some(expiration) if expiration > now => EffectiveStatus::Success,
            _ => EffectiveStatus::Expired,
        },
    }
}

/// Compute the instant the validity window closes, starting at `now`.
///
/// The window is `validity_days` wall-clock days in the configured reference
/// zone; the result is converted back to UTC for storage and comparison.
#[must_use]
pub fn expiration_after(now: DateTime<Utc>, config: &LifecycleConfig) -> DateTime<Utc> {
    let local = now.with_timezone(&config.reference_zone);
    if let Some(closing) = local.checked_add_days(Days::new(config.validity_days)) {
        return closing.with_timezone(&Utc);
    }
    // Unrepresentable wall-clock result (out-of-range date); fall back to
    // exact-duration days, clamped to a century so the fallback arithmetic
    // stays in range itself.
    let days = i64::try_from(config.validity_days.min(36_500)).unwrap_or(36_500);
    now.checked_add_signed(chrono::Duration::days(days))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Apply an external confirmation, yielding the stored status and expiration
/// to write.
///
/// `success` opens a fresh validity window from `now`; anything else clears
/// it. Re-applying the same confirmation recomputes the same rule, so the
/// operation is idempotent in effect.
#[must_use]
pub fn apply_confirmation(
    confirmed: ConfirmedStatus,
    now: DateTime<Utc>,
    config: &LifecycleConfig,
) -> (ReleaseStatus, Option<DateTime<Utc>>) {
    match confirmed {
        ConfirmedStatus::Success => (ReleaseStatus::Success, Some(expiration_after(now, config))),
        ConfirmedStatus::Pending => (ReleaseStatus::Pending, None),
        ConfirmedStatus::Failed => (ReleaseStatus::Failed, None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use chrono::Duration;

    fn config() -> LifecycleConfig {
        LifecycleConfig::default()
    }

    #[test]
    fn test_effective_status_derivation_table() {
        let now = Utc::now();
        let future = Some(now + Duration::days(1));
        let past = Some(now - Duration::seconds(1));

        assert_eq!(
            effective_status(ReleaseStatus::Pending, None, now),
            EffectiveStatus::Pending
        );
        assert_eq!(
            effective_status(ReleaseStatus::Failed, None, now),
            EffectiveStatus::Failed
        );
        assert_eq!(
            effective_status(ReleaseStatus::Expired, None, now),
            EffectiveStatus::Expired
        );
        assert_eq!(
            effective_status(ReleaseStatus::Success, future, now),
            EffectiveStatus::Success
        );
        assert_eq!(
            effective_status(ReleaseStatus::Success, past, now),
            EffectiveStatus::Expired
        );
        // Missing expiration on a stored success is treated as lapsed.
        assert_eq!(
            effective_status(ReleaseStatus::Success, None, now),
            EffectiveStatus::Expired
        );
    }

    #[test]
    fn test_success_at_exact_expiration_instant_is_expired() {
        let now = Utc::now();
        assert_eq!(
            effective_status(ReleaseStatus::Success, Some(now), now),
            EffectiveStatus::Expired
        );
    }

    #[test]
    fn test_confirmation_success_opens_window() {
        let now = Utc::now();
        let (status, expiration) = apply_confirmation(ConfirmedStatus::Success, now, &config());

        assert_eq!(status, ReleaseStatus::Success);
        let expiration = expiration.unwrap();
        // 90 wall-clock days; DST drift keeps this within a day either side.
        let delta = expiration - now;
        assert!(delta >= Duration::days(89) && delta <= Duration::days(91));
    }

    #[test]
    fn test_confirmation_failed_clears_window() {
        let now = Utc::now();
        assert_eq!(
            apply_confirmation(ConfirmedStatus::Failed, now, &config()),
            (ReleaseStatus::Failed, None)
        );
        assert_eq!(
            apply_confirmation(ConfirmedStatus::Pending, now, &config()),
            (ReleaseStatus::Pending, None)
        );
    }

    #[test]
    fn test_expiration_is_wall_clock_in_reference_zone() {
        let now = Utc::now();
        let cfg = config();
        let expiration = expiration_after(now, &cfg);

        let start_local = now.with_timezone(&cfg.reference_zone);
        let end_local = expiration.with_timezone(&cfg.reference_zone);
        assert_eq!(end_local.time(), start_local.time());
    }

    #[test]
    fn test_expiration_with_unrepresentable_window_does_not_panic() {
        let now = Utc::now();
        let cfg = config().with_validity_days(u64::MAX);

        let expiration = expiration_after(now, &cfg);
        assert!(expiration > now);
    }

    #[test]
    fn test_confirmed_status_parse_rejects_expired() {
        assert_eq!(
            ConfirmedStatus::parse("success").unwrap(),
            ConfirmedStatus::Success
        );
        assert!(ConfirmedStatus::parse("expired").is_err());
        assert!(ConfirmedStatus::parse("done").is_err());
        assert!(ConfirmedStatus::parse("").is_err());
    }

    #[test]
    fn test_status_round_trip_str() {
        for status in [
            ReleaseStatus::Pending,
            ReleaseStatus::Success,
            ReleaseStatus::Failed,
            ReleaseStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<ReleaseStatus>().unwrap(), status);
        }
    }
}
