//! Freshness window for stored readings.

use time::{Duration, OffsetDateTime};

/// Decides whether the last update is too old to be reported.
///
/// A zero timeout disables staleness entirely, for deployments where the
/// advertisement cadence is unpredictable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StalenessPolicy {
    timeout: Duration,
}

impl StalenessPolicy {
    /// Staleness is never reported.
    pub const DISABLED: Self = Self {
        timeout: Duration::ZERO,
    };

    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Build a policy from a timeout in (possibly fractional) minutes.
    ///
    /// Callers validate the input; negative or non-finite values disable the policy.
    pub fn from_minutes(minutes: f64) -> Self {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Self::DISABLED;
        }
        let seconds = minutes * 60.0;
        if seconds >= i64::MAX as f64 {
            return Self::new(Duration::MAX);
        }
        Self::new(Duration::seconds_f64(seconds))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_enabled(&self) -> bool {
        self.timeout.is_positive()
    }

    /// `true` once at least `timeout` has elapsed since `last_updated_at`.
    ///
    /// No data yet (`None`) is never stale: that is a separate condition.
    pub fn is_stale(&self, last_updated_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
        if !self.is_enabled() {
            return false;
        }
        match last_updated_at {
            Some(last) => now - last >= self.timeout,
            None => false,
        }
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(Duration::minutes(15))
    }
}
