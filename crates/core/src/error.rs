//! Error types for channelhub
//!
//! One error enum is shared by every layer. We use `thiserror` for automatic
//! `Display` and `Error` trait implementations.
//!
//! The variants follow the hub's error taxonomy:
//! - `InvalidArgument`: malformed names, blank payloads, bad options (400)
//! - `Conflict`: duplicate channel names, lost update races (409)
//! - `NotFound`: unknown channel or item (404)
//! - `PayloadTooLarge`: item body above the configured limit (413)
//! - `StorageFailure` / `IoError` / `SerializationError` / `Corruption`:
//!   the durable layer failed; fatal to the triggering operation (500)

use std::io;
use thiserror::Error;

use crate::contract::ChannelNameError;

/// Result type alias for channelhub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for channelhub
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied something malformed; never retried automatically
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A channel with this name already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown channel or item
    #[error("Not found: {0}")]
    NotFound(String),

    /// Item payload exceeds the configured maximum
    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Size of the rejected payload
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Durable write or read failed
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Stored record could not be decoded
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// I/O error (config files, thread spawn)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    /// Construct an `InvalidArgument` error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Construct a `NotFound` error for a channel
    pub fn channel_not_found(name: &str) -> Self {
        Error::NotFound(format!("channel {} not found", name))
    }

    /// Construct a `StorageFailure` error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::StorageFailure(msg.into())
    }

    /// HTTP status class a transport layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidArgument(_) => 400,
            Error::NotFound(_) => 404,
            Error::Conflict(_) => 409,
            Error::PayloadTooLarge { .. } => 413,
            Error::StorageFailure(_)
            | Error::Corruption(_)
            | Error::SerializationError(_)
            | Error::IoError(_) => 500,
        }
    }

    /// Whether a caller may reasonably retry the same operation
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::StorageFailure(_) | Error::IoError(_))
    }

    /// Check for `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<ChannelNameError> for Error {
    fn from(e: ChannelNameError) -> Self {
        Error::InvalidArgument(e.to_string())
    }
}
