//! Core types and traits for channelhub
//!
//! This crate defines the foundational types used throughout the system:
//! - ChannelName: trimmed, validated channel identity
//! - SequenceKey: channel-scoped total order of items
//! - Timestamp: millisecond instants
//! - TimeBucket: UTC day/hour/minute/second query windows
//! - ChannelConfig / ChannelOptions / ChannelUpdate: channel metadata
//! - Item: one entry of a channel's log
//! - Clock: wall-clock abstraction
//! - OrderedStore: the abstract ordered key-value store the engine runs on
//! - Error: the shared error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod clock;
pub mod contract;
pub mod error;
pub mod item;
pub mod traits;

pub use channel::{
    ChannelConfig, ChannelOptions, ChannelUpdate, StorageMode, DEFAULT_TTL_DAYS,
    DEFAULT_TTL_MILLIS, MILLIS_PER_DAY,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use contract::{
    ChannelName, ChannelNameError, SequenceKey, TimeBucket, TimeUnit, Timestamp,
};
pub use error::{Error, Result};
pub use item::{Item, DEFAULT_CONTENT_TYPE};
pub use traits::{Direction, Entry, KeySpace, OrderedStore, Partition, StoreKey};
