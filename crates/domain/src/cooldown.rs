//! Cooldown — minimum elapsed time between automatic snapshot updates.

use chrono::TimeDelta;
use serde::Serialize;

use crate::error::ValidationError;
use crate::time::Timestamp;

/// Validated cooldown window, in (possibly fractional) minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cooldown(f64);

impl Cooldown {
    /// Upper bound accepted from configuration.
    pub const MAX_MINUTES: f64 = 30.0;
    /// Value used when configuration omits the cooldown.
    pub const DEFAULT_MINUTES: f64 = 15.0;

    /// No rate limiting at all.
    pub const NONE: Self = Self(0.0);

    /// Build a cooldown from minutes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::CooldownOutOfRange`] when `minutes` is
    /// negative, above [`MAX_MINUTES`](Self::MAX_MINUTES) or not finite.
    pub fn from_minutes(minutes: f64) -> Result<Self, ValidationError> {
        if !minutes.is_finite() || !(0.0..=Self::MAX_MINUTES).contains(&minutes) {
            return Err(ValidationError::CooldownOutOfRange {
                actual: minutes,
                max: Self::MAX_MINUTES,
            });
        }
        Ok(Self(minutes))
    }

    #[must_use]
    pub fn minutes(self) -> f64 {
        self.0
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_delta(self) -> TimeDelta {
        // bounded to 30 minutes, well inside i64 microseconds
        TimeDelta::microseconds((self.0 * 60_000_000.0).round() as i64)
    }

    /// Whether a trigger at `now` may fetch, given the last successful update.
    ///
    /// Always allowed when no update happened yet.
    #[must_use]
    pub fn allows(self, last_update: Option<Timestamp>, now: Timestamp) -> bool {
        match last_update {
            None => true,
            Some(last) => now - last >= self.as_delta(),
        }
    }

    /// Time left before [`allows`](Self::allows) turns true, zero if already allowed.
    #[must_use]
    pub fn remaining(self, last_update: Option<Timestamp>, now: Timestamp) -> TimeDelta {
        match last_update {
            None => TimeDelta::zero(),
            Some(last) => (self.as_delta() - (now - last)).max(TimeDelta::zero()),
        }
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self(Self::DEFAULT_MINUTES)
    }
}
