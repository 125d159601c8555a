//! Channel name type
//!
//! Channel names are the only identity a channel has. They are case-sensitive
//! (`Foo` and `foo` are different channels) and are trimmed of leading and
//! trailing whitespace before validation, comparison and storage.
//!
//! ## Validation
//!
//! After trimming, channel names must:
//! - Be 1-256 bytes
//! - Contain only printable ASCII (`!` through `~`)
//! - Not contain a forward slash
//!
//! Spaces, control characters and anything outside ASCII (including the
//! upper/extended range) are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a channel name
pub const MAX_CHANNEL_NAME_LENGTH: usize = 256;

/// Validated, trimmed channel name
///
/// ## Examples
///
/// Valid names:
/// - "flights"
/// - "my_channel__x_"
/// - "Flights.v2"
///
/// Invalid names:
/// - "" / "    " (empty after trimming)
/// - "a/b"
/// - "has spaces"
/// - "ümlaut"
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelName(String);

/// Error when validating a channel name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelNameError {
    /// Name is empty or whitespace-only
    Empty,
    /// Name exceeds maximum length
    TooLong {
        /// Actual length of the name
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
    /// Name contains a forward slash
    Slash {
        /// Position of the slash
        position: usize,
    },
    /// Name contains a space or other disallowed character
    InvalidChar {
        /// The invalid character
        char: char,
        /// Position of the invalid character
        position: usize,
    },
}

impl fmt::Display for ChannelNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelNameError::Empty => write!(f, "channel name cannot be blank"),
            ChannelNameError::TooLong { length, max } => {
                write!(f, "channel name too long: {} bytes (max {})", length, max)
            }
            ChannelNameError::Slash { position } => {
                write!(f, "channel name cannot contain '/' (position {})", position)
            }
            ChannelNameError::InvalidChar { char, position } => write!(
                f,
                "invalid character {:?} at position {} (only printable ASCII without spaces allowed)",
                char, position
            ),
        }
    }
}

impl std::error::Error for ChannelNameError {}

impl ChannelName {
    /// Trim and validate a raw channel name
    ///
    /// # Errors
    ///
    /// Returns `ChannelNameError` if the trimmed name is invalid.
    pub fn parse(raw: &str) -> Result<Self, ChannelNameError> {
        let name = Self::trim(raw);
        Self::validate(name)?;
        Ok(ChannelName(name.to_string()))
    }

    /// Strip leading and trailing ASCII whitespace
    ///
    /// Other Unicode whitespace is left in place, so it fails validation.
    pub fn trim(raw: &str) -> &str {
        raw.trim_matches(|c: char| c.is_ascii_whitespace())
    }

    /// Create a ChannelName without validation
    ///
    /// The caller must ensure the name is valid and already trimmed.
    /// Use `parse()` for untrusted input.
    pub fn new_unchecked(name: impl Into<String>) -> Self {
        ChannelName(name.into())
    }

    /// Validate an already-trimmed channel name
    pub fn validate(name: &str) -> Result<(), ChannelNameError> {
        if name.is_empty() {
            return Err(ChannelNameError::Empty);
        }

        if name.len() > MAX_CHANNEL_NAME_LENGTH {
            return Err(ChannelNameError::TooLong {
                length: name.len(),
                max: MAX_CHANNEL_NAME_LENGTH,
            });
        }

        for (pos, ch) in name.chars().enumerate() {
            if ch == '/' {
                return Err(ChannelNameError::Slash { position: pos });
            }
            if !Self::is_valid_char(ch) {
                return Err(ChannelNameError::InvalidChar {
                    char: ch,
                    position: pos,
                });
            }
        }

        Ok(())
    }

    /// Printable ASCII, excluding space
    #[inline]
    fn is_valid_char(c: char) -> bool {
        c.is_ascii_graphic()
    }

    /// Get the name as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ChannelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ChannelName {
    type Error = ChannelNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ChannelName::parse(value)
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ChannelNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ChannelName::parse(&value)
    }
}
