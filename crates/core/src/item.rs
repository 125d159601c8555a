//! Item record
//!
//! An item is an opaque payload plus its content type, addressed by the
//! channel it belongs to and the sequence key it was assigned at append time.
//! Items hold only the channel's name; the channel owns the log.

use serde::{Deserialize, Serialize};

use crate::contract::{ChannelName, SequenceKey, Timestamp};

/// Content type recorded when an append does not supply one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One entry of a channel's item log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Owning channel (back-reference by name)
    pub channel: ChannelName,
    /// Position in the channel's total order
    pub key: SequenceKey,
    /// MIME type supplied with the payload
    pub content_type: String,
    /// Opaque payload bytes
    pub payload: Vec<u8>,
}

impl Item {
    /// Insertion time; equals the time component of the sequence key
    #[inline]
    pub fn inserted_at(&self) -> Timestamp {
        self.key.timestamp()
    }

    /// Payload length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty (never true for a stored item)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
