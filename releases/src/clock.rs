//! Reference clock abstraction.
//!
//! Every time-sensitive decision in the lifecycle (expiration derivation, the
//! sweep, the +90-day window) reads the clock through [`ReferenceClock`], so
//! tests can pin or advance "now" deterministically and production code has a
//! single auditable time source.

use chrono::{DateTime, Utc};
use std::sync::RwLock;

/// Clock used by the lifecycle engine.
///
/// Implementations must be cheap to call; the store reads the clock on every
/// time-aware query.
pub trait ReferenceClock: Send + Sync {
    /// Get the current instant as UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// System clock backed by [`Utc::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl ReferenceClock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and deterministic runs.
///
/// # Examples
///
/// ```
/// use release_portal_releases::clock::{FixedClock, ReferenceClock};
/// use chrono::Duration;
///
/// let clock = FixedClock::now();
/// let before = clock.now_utc();
/// clock.advance(Duration::days(91));
/// assert_eq!(clock.now_utc() - before, Duration::days(91));
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock pinned at `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(instant),
        }
    }

    /// Create a clock pinned at the current system time.
    #[must_use]
    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: chrono::Duration) {
        if let Ok(mut now) = self.now.write() {
            *now += delta;
        }
    }

    /// Pin the clock at `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut now) = self.now.write() {
            *now = instant;
        }
    }
}

impl ReferenceClock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now.read().map_or_else(|_| Utc::now(), |now| *now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now_utc();
        let b = clock.now_utc();
        assert!(b >= a);
    }

    #[test]
    fn test_fixed_clock_set_and_advance() {
        let instant = Utc::now();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now_utc(), instant);

        clock.advance(Duration::hours(2));
        assert_eq!(clock.now_utc(), instant + Duration::hours(2));

        clock.set(instant);
        assert_eq!(clock.now_utc(), instant);
    }
}
