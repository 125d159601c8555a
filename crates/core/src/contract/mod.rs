//! Contract types
//!
//! Value types that define the hub's identity and ordering rules:
//!
//! - `channel_name`: validated, trimmed, case-sensitive channel identity
//! - `sequence_key`: the `(timestamp, counter)` total order of a channel's items
//! - `time_bucket`: UTC day/hour/minute/second windows addressed by path
//! - `timestamp`: millisecond wall-clock instants

pub mod channel_name;
pub mod sequence_key;
pub mod time_bucket;
pub mod timestamp;

pub use channel_name::{ChannelName, ChannelNameError, MAX_CHANNEL_NAME_LENGTH};
pub use sequence_key::{SequenceKey, SEQUENCE_KEY_LEN};
pub use time_bucket::{TimeBucket, TimeUnit};
pub use timestamp::Timestamp;
