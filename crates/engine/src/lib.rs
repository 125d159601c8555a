//! Engine for channelhub
//!
//! This crate orchestrates the lower layers:
//! - ChannelRegistry: atomic name reservation and channel metadata
//! - ItemSequencer: per-channel `(timestamp, counter)` ordering
//! - LinkResolver: self/previous/next/latest links derived on every read
//! - Count and time pages over each channel's ordered index
//! - RetentionSweeper: TTL eviction in a background thread
//! - Hub: the operation surface a transport layer calls
//!
//! The engine is the only component that knows about:
//! - How channel records and item logs relate
//! - Response document shapes
//! - Configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod hub;
pub mod links;
pub mod registry;
pub mod representation;
pub mod retention;
pub mod sequencer;

pub use config::{HubConfig, RetentionConfig, CONFIG_FILE_NAME};
pub use hub::{Hub, MAX_PAGE_COUNT};
pub use links::{ChannelLinks, ItemLinks, LinkResolver};
pub use registry::ChannelRegistry;
pub use representation::{
    ChannelDocument, ChannelLinksDocument, Href, InsertedItemDocument, InsertedItemLinks,
    ItemResponse, PageDocument, PageLinks,
};
pub use retention::{RetentionSweeper, SweepReport, SweepState};
pub use sequencer::ItemSequencer;
