//! channelhub - channel-based event store
//!
//! Clients create named channels, append opaque items to them, and walk the
//! items through hypermedia links (self, previous, next, latest). Each
//! channel keeps its items for a configurable TTL.
//!
//! # Quick Start
//!
//! ```ignore
//! use channelhub::{ChannelOptions, Hub, HubConfig};
//!
//! let hub = Hub::open(HubConfig::default())?;
//! hub.create_channel(&ChannelOptions::new("flights").with_ttl_days(3))?;
//!
//! let inserted = hub.append_item("flights", b"AA100 landed".to_vec(), Some("text/plain"))?;
//! let item = hub.get_latest("flights")?;
//! assert_eq!(item.links.self_uri, inserted.location());
//! assert!(item.links.previous.is_none());
//! ```
//!
//! # Architecture
//!
//! All operations go through [`Hub`]. Transport framing (HTTP, WebSocket)
//! lives outside this crate; the documents it needs are in
//! [`ChannelDocument`], [`InsertedItemDocument`], [`ItemResponse`] and
//! [`PageDocument`].

pub use channelhub_core::{
    ChannelConfig, ChannelName, ChannelNameError, ChannelOptions, ChannelUpdate, Clock, Error,
    Item, ManualClock, OrderedStore, Result, SequenceKey, StorageMode, SystemClock, TimeBucket,
    TimeUnit, Timestamp, DEFAULT_CONTENT_TYPE, DEFAULT_TTL_DAYS, DEFAULT_TTL_MILLIS,
};
pub use channelhub_engine::{
    ChannelDocument, ChannelLinks, Hub, HubConfig, InsertedItemDocument, ItemLinks, ItemResponse,
    PageDocument, RetentionConfig, SweepReport, SweepState, CONFIG_FILE_NAME, MAX_PAGE_COUNT,
};
pub use channelhub_storage::{ShardedStore, UnifiedStore};
