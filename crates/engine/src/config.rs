//! Hub configuration via `hub.toml`
//!
//! A single TOML file holds every tunable. On first start a commented default
//! `hub.toml` can be written next to the data; to change settings, edit the
//! file and restart.

use serde::{Deserialize, Serialize};
use std::path::Path;

use channelhub_core::{Error, Result, DEFAULT_TTL_DAYS};

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "hub.toml";

/// Default public base URI used when building links.
pub const DEFAULT_BASE_URI: &str = "http://localhost:8080";

/// Default maximum item payload: 40 MiB.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 40 * 1024 * 1024;

fn default_base_uri() -> String {
    DEFAULT_BASE_URI.to_string()
}

fn default_ttl_days() -> u64 {
    DEFAULT_TTL_DAYS
}

fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

fn default_interval_ms() -> u64 {
    60_000
}

fn default_batch_size() -> usize {
    1_000
}

fn default_max_evictions() -> usize {
    100_000
}

/// Retention sweeper settings, the `[retention]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetentionConfig {
    /// Time between sweep cycles in milliseconds (default: 60000)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Items read per scan of a channel's oldest prefix (default: 1000)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Upper bound on evictions per channel per cycle (default: 100000)
    #[serde(default = "default_max_evictions")]
    pub max_evictions_per_channel: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            batch_size: default_batch_size(),
            max_evictions_per_channel: default_max_evictions(),
        }
    }
}

/// Hub configuration loaded from `hub.toml`.
///
/// # Example
///
/// ```toml
/// base_uri = "http://hub.example.com"
/// default_ttl_days = 120
///
/// [retention]
/// interval_ms = 60000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HubConfig {
    /// Public base URI that prefixes every link.
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
    /// TTL in days for channels created without one.
    #[serde(default = "default_ttl_days")]
    pub default_ttl_days: u64,
    /// Largest accepted item payload in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Retention sweeper settings.
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            default_ttl_days: default_ttl_days(),
            max_payload_bytes: default_max_payload_bytes(),
            retention: RetentionConfig::default(),
        }
    }
}

impl HubConfig {
    /// Check every value and strip a trailing slash from `base_uri`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero TTL, size, interval or budget, or for a
    /// base URI that is not `http://` or `https://`.
    pub fn validate(mut self) -> Result<Self> {
        let trimmed = self.base_uri.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::invalid_argument(format!(
                "Invalid base_uri '{}' in hub.toml. Expected an http:// or https:// URI.",
                self.base_uri
            )));
        }
        self.base_uri = trimmed;

        let zero_checks = [
            ("default_ttl_days", self.default_ttl_days == 0),
            ("max_payload_bytes", self.max_payload_bytes == 0),
            ("retention.interval_ms", self.retention.interval_ms == 0),
            ("retention.batch_size", self.retention.batch_size == 0),
            (
                "retention.max_evictions_per_channel",
                self.retention.max_evictions_per_channel == 0,
            ),
        ];
        if let Some((field, _)) = zero_checks.iter().find(|(_, is_zero)| *is_zero) {
            return Err(Error::invalid_argument(format!(
                "{} in hub.toml must be greater than zero",
                field
            )));
        }
        Ok(self)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Channel hub configuration
#
# Public base URI used to build self/previous/next/latest links.
base_uri = "http://localhost:8080"

# TTL in days for channels created without ttlDays or ttlMillis (default: 120)
default_ttl_days = 120

# Largest accepted item payload in bytes (default: 40 MiB)
max_payload_bytes = 41943040

[retention]
# Time between sweep cycles in milliseconds (default: 60000)
interval_ms = 60000
# Items read per scan of a channel's oldest prefix (default: 1000)
batch_size = 1000
# Upper bound on evictions per channel per cycle (default: 100000)
max_evictions_per_channel = 100000
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::storage(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: HubConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_argument(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::storage(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::SerializationError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::storage(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
