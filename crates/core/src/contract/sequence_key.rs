//! Channel-scoped sequence keys
//!
//! A `SequenceKey` is the sole source of item ordering inside a channel. It is
//! the pair `(timestamp, counter)`: the insertion time in milliseconds plus a
//! tie-break counter for items inserted within the same millisecond. The
//! derived ordering compares timestamp first, then counter.
//!
//! ## Encodings
//!
//! - **Storage**: 16 bytes, timestamp then counter, both big-endian, so the
//!   byte order of encoded keys equals the logical order.
//! - **URI path**: `yyyy/MM/dd/HH/mm/ss/SSS/counter` in UTC, e.g.
//!   `2013/06/25/18/03/54/123/000000`.

use chrono::{Datelike, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::contract::Timestamp;
use crate::error::{Error, Result};

/// Encoded length of a sequence key in bytes
pub const SEQUENCE_KEY_LEN: usize = 16;

/// Total-order key assigned to an item at append time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceKey {
    timestamp: Timestamp,
    counter: u64,
}

impl SequenceKey {
    /// Create a key from its parts
    pub const fn new(timestamp: Timestamp, counter: u64) -> Self {
        Self { timestamp, counter }
    }

    /// The smallest key strictly greater than `high_water` at time `now`
    ///
    /// If the clock has moved past the high-water mark the counter restarts at
    /// zero. Otherwise (same tick, or the clock stepped backwards) the
    /// high-water timestamp is reused with the next counter value.
    pub fn next_after(high_water: Option<SequenceKey>, now: Timestamp) -> Self {
        match high_water {
            None => Self::new(now, 0),
            Some(last) if now > last.timestamp => Self::new(now, 0),
            Some(last) => match last.counter.checked_add(1) {
                Some(counter) => Self::new(last.timestamp, counter),
                None => Self::new(Timestamp::from_millis(last.timestamp.as_millis() + 1), 0),
            },
        }
    }

    /// Insertion time component
    #[inline]
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Tie-break counter component
    #[inline]
    pub const fn counter(&self) -> u64 {
        self.counter
    }

    /// Order-preserving storage encoding
    pub fn to_bytes(&self) -> [u8; SEQUENCE_KEY_LEN] {
        let mut out = [0u8; SEQUENCE_KEY_LEN];
        out[..8].copy_from_slice(&self.timestamp.as_millis().to_be_bytes());
        out[8..].copy_from_slice(&self.counter.to_be_bytes());
        out
    }

    /// Decode the storage encoding
    ///
    /// # Errors
    ///
    /// Returns `Error::Corruption` if the slice is not exactly 16 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SEQUENCE_KEY_LEN {
            return Err(Error::Corruption(format!(
                "sequence key must be {} bytes, got {}",
                SEQUENCE_KEY_LEN,
                bytes.len()
            )));
        }
        let mut millis = [0u8; 8];
        let mut counter = [0u8; 8];
        millis.copy_from_slice(&bytes[..8]);
        counter.copy_from_slice(&bytes[8..]);
        Ok(Self::new(
            Timestamp::from_millis(u64::from_be_bytes(millis)),
            u64::from_be_bytes(counter),
        ))
    }

    /// Render the URI path form
    pub fn to_path(&self) -> String {
        match self.timestamp.to_datetime() {
            Some(dt) => format!(
                "{:04}/{:02}/{:02}/{:02}/{:02}/{:02}/{:03}/{:06}",
                dt.year(),
                dt.month(),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second(),
                dt.timestamp_subsec_millis(),
                self.counter
            ),
            None => format!("{}/{:06}", self.timestamp.as_millis(), self.counter),
        }
    }

    /// Parse the URI path form
    ///
    /// Leading and trailing slashes are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the path is not eight numeric
    /// segments describing a valid UTC instant.
    pub fn from_path(path: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("malformed item key '{}'", path));

        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        if parts.len() != 8 {
            return Err(invalid());
        }
        let mut fields = [0u32; 7];
        for (slot, part) in fields.iter_mut().zip(&parts[..7]) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        let counter: u64 = parts[7].parse().map_err(|_| invalid())?;

        let [year, month, day, hour, minute, second, millis] = fields;
        let year = i32::try_from(year).map_err(|_| invalid())?;
        let datetime = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_milli_opt(hour, minute, second, millis))
            .ok_or_else(invalid)?
            .and_utc();

        Ok(Self::new(Timestamp::from(datetime), counter))
    }
}

impl fmt::Display for SequenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}
