//! UTC time buckets
//!
//! A bucket is one UTC day, hour, minute or second, addressed by a prefix of
//! the item path layout: `yyyy/MM/dd[/HH[/mm[/ss]]]`. The number of segments
//! picks the unit. Buckets are half-open: `[start, start + unit)`.

use chrono::{Datelike, NaiveDate, Timelike};
use std::fmt;
use std::time::Duration;

use crate::contract::Timestamp;
use crate::error::{Error, Result};

/// Width of a time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// `yyyy/MM/dd`
    Day,
    /// `yyyy/MM/dd/HH`
    Hour,
    /// `yyyy/MM/dd/HH/mm`
    Minute,
    /// `yyyy/MM/dd/HH/mm/ss`
    Second,
}

impl TimeUnit {
    /// Bucket width in milliseconds
    pub const fn millis(&self) -> u64 {
        match self {
            TimeUnit::Day => 86_400_000,
            TimeUnit::Hour => 3_600_000,
            TimeUnit::Minute => 60_000,
            TimeUnit::Second => 1_000,
        }
    }

    /// Bucket width
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.millis())
    }

    /// Number of path segments that address this unit
    pub const fn segments(&self) -> usize {
        match self {
            TimeUnit::Day => 3,
            TimeUnit::Hour => 4,
            TimeUnit::Minute => 5,
            TimeUnit::Second => 6,
        }
    }

    fn from_segments(count: usize) -> Option<Self> {
        match count {
            3 => Some(TimeUnit::Day),
            4 => Some(TimeUnit::Hour),
            5 => Some(TimeUnit::Minute),
            6 => Some(TimeUnit::Second),
            _ => None,
        }
    }
}

/// One UTC day, hour, minute or second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBucket {
    start: Timestamp,
    unit: TimeUnit,
}

impl TimeBucket {
    /// The bucket of width `unit` that contains `at`
    pub fn containing(at: Timestamp, unit: TimeUnit) -> Self {
        let width = unit.millis();
        Self {
            start: Timestamp::from_millis(at.as_millis() / width * width),
            unit,
        }
    }

    /// Parse `yyyy/MM/dd[/HH[/mm[/ss]]]`
    ///
    /// Leading and trailing slashes are ignored.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for anything other than three to six numeric
    /// segments naming a valid UTC instant at or after the epoch.
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("malformed time path '{}'", path));

        let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
        let unit = TimeUnit::from_segments(parts.len()).ok_or_else(invalid)?;
        let mut fields = [0u32; 6];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }

        let [year, month, day, hour, minute, second] = fields;
        if year < 1970 {
            return Err(invalid());
        }
        let year = i32::try_from(year).map_err(|_| invalid())?;
        let start = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .ok_or_else(invalid)?
            .and_utc();

        Ok(Self {
            start: Timestamp::from(start),
            unit,
        })
    }

    /// First instant inside the bucket
    #[inline]
    pub const fn start(&self) -> Timestamp {
        self.start
    }

    /// First instant after the bucket
    pub fn end(&self) -> Timestamp {
        self.start.saturating_add(self.unit.duration())
    }

    /// Bucket width
    #[inline]
    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Whether `at` falls inside the bucket
    pub fn contains(&self, at: Timestamp) -> bool {
        at >= self.start && at < self.end()
    }

    /// The bucket right after this one
    pub fn next(&self) -> Self {
        Self {
            start: self.end(),
            unit: self.unit,
        }
    }

    /// The bucket right before this one, or `None` at the epoch
    pub fn previous(&self) -> Option<Self> {
        let start = self.start.as_millis().checked_sub(self.unit.millis())?;
        Some(Self {
            start: Timestamp::from_millis(start),
            unit: self.unit,
        })
    }

    /// Render the path form
    pub fn to_path(&self) -> String {
        let Some(dt) = self.start.to_datetime() else {
            return self.start.as_millis().to_string();
        };
        let fields = [
            format!("{:04}", dt.year()),
            format!("{:02}", dt.month()),
            format!("{:02}", dt.day()),
            format!("{:02}", dt.hour()),
            format!("{:02}", dt.minute()),
            format!("{:02}", dt.second()),
        ];
        fields[..self.unit.segments()].join("/")
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}
