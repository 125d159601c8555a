//! Millisecond-precision timestamp type
//!
//! Channel creation dates, item insertion times and TTL arithmetic all use
//! this type. Timestamps are stored as milliseconds since Unix epoch
//! (1970-01-01 00:00:00 UTC), which matches the granularity of item URIs.
//!
//! ## Usage
//!
//! Never expose raw arithmetic. Use explicit constructors:
//!
//! ```
//! use channelhub_core::Timestamp;
//!
//! let now = Timestamp::now();
//! let from_secs = Timestamp::from_secs(1000);
//! let from_millis = Timestamp::from_millis(1_000_000);
//! assert_eq!(from_secs, from_millis);
//! ```

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Millisecond-precision timestamp
///
/// ## Invariants
///
/// - Timestamps are always non-negative (u64)
/// - Timestamps are always in milliseconds
/// - The zero timestamp represents Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Maximum representable timestamp
    pub const MAX: Timestamp = Timestamp(u64::MAX);

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a timestamp for the current moment
    ///
    /// Returns epoch (0) if the system clock is before Unix epoch.
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp(duration.as_millis() as u64)
    }

    /// Create a timestamp from milliseconds since epoch
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    /// Create a timestamp from seconds since epoch
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1_000))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get milliseconds since Unix epoch
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Get seconds since Unix epoch (truncates)
    #[inline]
    pub const fn as_secs(&self) -> u64 {
        self.0 / 1_000
    }

    /// Convert to a UTC `DateTime`
    ///
    /// Returns `None` for values beyond chrono's representable range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let millis = i64::try_from(self.0).ok()?;
        Utc.timestamp_millis_opt(millis).single()
    }

    /// Render as RFC 3339 with millisecond precision, e.g. `2013-06-25T18:03:54.123Z`
    pub fn to_rfc3339(&self) -> String {
        match self.to_datetime() {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            None => self.0.to_string(),
        }
    }

    // =========================================================================
    // Duration Operations
    // =========================================================================

    /// Milliseconds elapsed since `earlier`, saturating at zero
    #[inline]
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Compute duration since an earlier timestamp
    ///
    /// Returns `None` if `earlier` is actually later than `self`.
    pub fn duration_since(&self, earlier: Timestamp) -> Option<Duration> {
        if self.0 >= earlier.0 {
            Some(Duration::from_millis(self.0 - earlier.0))
        } else {
            None
        }
    }

    /// Add a duration to this timestamp
    ///
    /// Saturates at `Timestamp::MAX` on overflow.
    pub fn saturating_add(&self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_add(duration.as_millis() as u64))
    }

    /// Subtract a duration from this timestamp
    ///
    /// Saturates at `Timestamp::EPOCH` on underflow.
    pub fn saturating_sub(&self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_sub(duration.as_millis() as u64))
    }

    /// Check if this timestamp is before another
    #[inline]
    pub fn is_before(&self, other: Timestamp) -> bool {
        self.0 < other.0
    }

    /// Check if this timestamp is after another
    #[inline]
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::EPOCH
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl From<u64> for Timestamp {
    /// Create from raw milliseconds
    fn from(millis: u64) -> Self {
        Timestamp::from_millis(millis)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    /// Dates before the epoch clamp to `Timestamp::EPOCH`
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp(u64::try_from(dt.timestamp_millis()).unwrap_or(0))
    }
}
