//! Channel metadata types
//!
//! - `ChannelOptions`: what a caller submits to create a channel
//! - `ChannelUpdate`: what a caller submits to change a channel's metadata
//! - `ChannelConfig`: the stored, immutable-identity channel record
//!
//! Both request types deserialize from the camelCase JSON field names the hub
//! uses on the wire (`ttlDays`, `ttlMillis`, `contentSizeKB`, ...).

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::contract::{ChannelName, Timestamp};
use crate::error::{Error, Result};

/// Milliseconds in one day
pub const MILLIS_PER_DAY: u64 = 86_400_000;

/// TTL applied when a channel is created without one
pub const DEFAULT_TTL_DAYS: u64 = 120;

/// `DEFAULT_TTL_DAYS` in milliseconds (10,368,000,000)
pub const DEFAULT_TTL_MILLIS: u64 = DEFAULT_TTL_DAYS * MILLIS_PER_DAY;

/// Default `contentSizeKB` hint
pub const DEFAULT_CONTENT_SIZE_KB: u64 = 1;

/// Default `peakRequestRateSeconds` hint
pub const DEFAULT_PEAK_REQUEST_RATE_SECONDS: u64 = 1;

/// Which backend(s) hold a channel's items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StorageMode {
    /// Single-item backend
    #[default]
    Single,
    /// Batch backend
    Batch,
    /// Both backends
    Both,
}

impl StorageMode {
    /// Wire name (`SINGLE`, `BATCH`, `BOTH`)
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageMode::Single => "SINGLE",
            StorageMode::Batch => "BATCH",
            StorageMode::Both => "BOTH",
        }
    }
}

impl FromStr for StorageMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SINGLE" => Ok(StorageMode::Single),
            "BATCH" => Ok(StorageMode::Batch),
            "BOTH" => Ok(StorageMode::Both),
            other => Err(Error::invalid_argument(format!(
                "unknown storage '{}', expected SINGLE, BATCH or BOTH",
                other
            ))),
        }
    }
}

impl TryFrom<String> for StorageMode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<StorageMode> for String {
    fn from(mode: StorageMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn explicit_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request to create a channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOptions {
    /// Raw, untrimmed name
    #[serde(default)]
    pub name: String,
    /// Requested storage backend(s)
    #[serde(default)]
    pub storage: Option<StorageMode>,
    /// TTL in whole days; `Some(None)` is an explicit `null`
    #[serde(default, deserialize_with = "explicit_null")]
    pub ttl_days: Option<Option<u64>>,
    /// TTL in milliseconds
    #[serde(default)]
    pub ttl_millis: Option<u64>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form content type hint
    #[serde(default, rename = "type")]
    pub channel_type: Option<String>,
    /// Expected item size hint
    #[serde(default, rename = "contentSizeKB")]
    pub content_size_kb: Option<u64>,
    /// Expected peak request rate hint
    #[serde(default)]
    pub peak_request_rate_seconds: Option<u64>,
}

impl ChannelOptions {
    /// Options with only a name; everything else defaults
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the storage mode
    pub fn with_storage(mut self, storage: StorageMode) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the TTL in days
    pub fn with_ttl_days(mut self, days: u64) -> Self {
        self.ttl_days = Some(Some(days));
        self
    }

    /// Set the TTL in milliseconds
    pub fn with_ttl_millis(mut self, millis: u64) -> Self {
        self.ttl_millis = Some(millis);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the type hint
    pub fn with_type(mut self, channel_type: impl Into<String>) -> Self {
        self.channel_type = Some(channel_type.into());
        self
    }
}

/// Request to change a channel's mutable metadata
///
/// Absent fields are left unchanged. `name` and `creationDate` cannot be
/// changed; unknown JSON fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelUpdate {
    /// New storage backend(s)
    #[serde(default)]
    pub storage: Option<StorageMode>,
    /// New TTL in days; `Some(None)` drops the day-granular TTL
    #[serde(default, deserialize_with = "explicit_null")]
    pub ttl_days: Option<Option<u64>>,
    /// New TTL in milliseconds
    #[serde(default)]
    pub ttl_millis: Option<u64>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New type hint
    #[serde(default, rename = "type")]
    pub channel_type: Option<String>,
    /// New item size hint
    #[serde(default, rename = "contentSizeKB")]
    pub content_size_kb: Option<u64>,
    /// New peak request rate hint
    #[serde(default)]
    pub peak_request_rate_seconds: Option<u64>,
}

/// Stored channel record
///
/// `name` and `creation_date` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Trimmed, validated name
    pub name: ChannelName,
    /// Storage mode as requested; `None` when the caller did not choose one
    pub storage: Option<StorageMode>,
    /// Item lifetime in milliseconds (always ≥ 1)
    pub ttl_millis: u64,
    /// Item lifetime in days, when it was expressed that way
    pub ttl_days: Option<u64>,
    /// Creation time
    pub creation_date: Timestamp,
    /// Free-form description
    pub description: Option<String>,
    /// Free-form type hint
    pub channel_type: Option<String>,
    /// Expected item size hint
    pub content_size_kb: u64,
    /// Expected peak request rate hint
    pub peak_request_rate_seconds: u64,
}

impl ChannelConfig {
    /// Validate `options` and build the record to store
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad name, a zero TTL, or a zero size/rate hint.
    pub fn from_options(
        options: &ChannelOptions,
        creation_date: Timestamp,
        default_ttl_days: u64,
    ) -> Result<Self> {
        let name = ChannelName::parse(&options.name)?;
        let (ttl_days, ttl_millis) = resolve_ttl(
            options.ttl_days,
            options.ttl_millis,
            (Some(default_ttl_days), days_to_millis(default_ttl_days)?),
        )?;

        Ok(Self {
            name,
            storage: options.storage,
            ttl_millis,
            ttl_days,
            creation_date,
            description: options.description.clone(),
            channel_type: options.channel_type.clone(),
            content_size_kb: positive(
                "contentSizeKB",
                options.content_size_kb.unwrap_or(DEFAULT_CONTENT_SIZE_KB),
            )?,
            peak_request_rate_seconds: positive(
                "peakRequestRateSeconds",
                options
                    .peak_request_rate_seconds
                    .unwrap_or(DEFAULT_PEAK_REQUEST_RATE_SECONDS),
            )?,
        })
    }

    /// Produce the record that results from applying `update`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero TTL or a zero size/rate hint.
    pub fn apply(&self, update: &ChannelUpdate) -> Result<Self> {
        let mut next = self.clone();
        if update.ttl_days.is_some() || update.ttl_millis.is_some() {
            let (ttl_days, ttl_millis) = resolve_ttl(
                update.ttl_days,
                update.ttl_millis,
                (None, self.ttl_millis),
            )?;
            next.ttl_days = ttl_days;
            next.ttl_millis = ttl_millis;
        }
        if let Some(storage) = update.storage {
            next.storage = Some(storage);
        }
        if let Some(description) = &update.description {
            next.description = Some(description.clone());
        }
        if let Some(channel_type) = &update.channel_type {
            next.channel_type = Some(channel_type.clone());
        }
        if let Some(size) = update.content_size_kb {
            next.content_size_kb = positive("contentSizeKB", size)?;
        }
        if let Some(rate) = update.peak_request_rate_seconds {
            next.peak_request_rate_seconds = positive("peakRequestRateSeconds", rate)?;
        }
        Ok(next)
    }

    /// Storage mode in effect (`SINGLE` unless chosen otherwise)
    pub fn effective_storage(&self) -> StorageMode {
        self.storage.unwrap_or_default()
    }

    /// Item lifetime
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_millis)
    }

    /// Whether an item inserted at `inserted_at` has outlived the TTL at `now`
    ///
    /// An item expires once its age strictly exceeds `ttl_millis`.
    #[inline]
    pub fn is_expired(&self, inserted_at: Timestamp, now: Timestamp) -> bool {
        now.millis_since(inserted_at) > self.ttl_millis
    }
}

fn days_to_millis(days: u64) -> Result<u64> {
    days.checked_mul(MILLIS_PER_DAY)
        .ok_or_else(|| Error::invalid_argument(format!("ttlDays {} is too large", days)))
}

fn positive(field: &str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(Error::invalid_argument(format!("{} must be at least 1", field)));
    }
    Ok(value)
}

/// Combine the two TTL inputs into `(ttl_days, ttl_millis)`
///
/// `ttlDays` wins when both are given. An explicit `ttlDays: null` without
/// `ttlMillis` keeps the fallback millisecond TTL but reports no day value.
fn resolve_ttl(
    ttl_days: Option<Option<u64>>,
    ttl_millis: Option<u64>,
    fallback: (Option<u64>, u64),
) -> Result<(Option<u64>, u64)> {
    if let Some(millis) = ttl_millis {
        positive("ttlMillis", millis)?;
    }
    match (ttl_days, ttl_millis) {
        (Some(Some(days)), _) => {
            positive("ttlDays", days)?;
            Ok((Some(days), days_to_millis(days)?))
        }
        (_, Some(millis)) => Ok((None, millis)),
        (Some(None), None) => Ok((None, fallback.1)),
        (None, None) => Ok(fallback),
    }
}
