//! The hub facade
//!
//! `Hub` is the operation surface a transport layer calls. It wires the
//! registry, sequencer, link resolver and retention sweeper to one store and
//! one clock, and turns their results into response documents.
//!
//! # Example
//!
//! ```ignore
//! use channelhub_engine::{Hub, HubConfig};
//! use channelhub_core::ChannelOptions;
//!
//! let hub = Hub::open(HubConfig::default())?;
//! let created = hub.create_channel(&ChannelOptions::new("flights"))?;
//! let inserted = hub.append_item("flights", b"AA100".to_vec(), Some("text/plain"))?;
//! let latest = hub.get_latest("flights")?;
//! assert_eq!(latest.links.self_uri, inserted.location());
//! ```

use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::info;

use channelhub_core::{
    ChannelConfig, ChannelName, ChannelOptions, ChannelUpdate, Clock, Direction, Error, Item,
    OrderedStore, Result, SequenceKey, SystemClock, TimeBucket,
};
use channelhub_storage::ShardedStore;

use crate::config::HubConfig;
use crate::links::LinkResolver;
use crate::registry::ChannelRegistry;
use crate::representation::{
    ChannelDocument, InsertedItemDocument, ItemResponse, PageDocument, PageLinks,
};
use crate::retention::{RetentionSweeper, SweepReport};
use crate::sequencer::ItemSequencer;

/// Largest page a count query returns; larger counts are clamped
pub const MAX_PAGE_COUNT: usize = 10_000;

/// Channel hub
pub struct Hub {
    config: HubConfig,
    clock: Arc<dyn Clock>,
    registry: Arc<ChannelRegistry>,
    sequencer: Arc<ItemSequencer>,
    links: LinkResolver,
    retention: Arc<RetentionSweeper>,
}

impl Hub {
    /// Open an in-memory hub on a `ShardedStore` and the system clock
    pub fn open(config: HubConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(ShardedStore::new()), Arc::new(SystemClock))
    }

    /// Open using `hub.toml` at `path`, writing the default file first if absent
    pub fn open_with_config_file(path: &Path) -> Result<Self> {
        HubConfig::write_default_if_missing(path)?;
        Self::open(HubConfig::from_file(path)?)
    }

    /// Open over an explicit store and clock
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `config` does not validate.
    pub fn with_store(
        config: HubConfig,
        store: Arc<dyn OrderedStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let config = config.validate()?;
        let registry = Arc::new(ChannelRegistry::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            config.default_ttl_days,
        ));
        let sequencer = Arc::new(ItemSequencer::new(store, Arc::clone(&clock)));
        let links = LinkResolver::new(&config.base_uri, Arc::clone(&sequencer));
        let retention = Arc::new(RetentionSweeper::new(
            Arc::clone(&registry),
            Arc::clone(&sequencer),
            Arc::clone(&clock),
            config.retention.clone(),
        ));

        info!(base_uri = %config.base_uri, "Hub opened");
        Ok(Self {
            config,
            clock,
            registry,
            sequencer,
            links,
            retention,
        })
    }

    /// Effective configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Channel registry
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Item sequencer
    pub fn sequencer(&self) -> &ItemSequencer {
        &self.sequencer
    }

    /// Link resolver
    pub fn links(&self) -> &LinkResolver {
        &self.links
    }

    /// Retention sweeper
    pub fn retention(&self) -> &Arc<RetentionSweeper> {
        &self.retention
    }

    // ========================================================================
    // Channels
    // ========================================================================

    fn channel_document(&self, config: &ChannelConfig) -> ChannelDocument {
        ChannelDocument::new(config, &self.links.channel_links(config.name.as_str()))
    }

    /// Create a channel
    pub fn create_channel(&self, options: &ChannelOptions) -> Result<ChannelDocument> {
        let config = self.registry.create(options)?;
        Ok(self.channel_document(&config))
    }

    /// Create a channel from a raw JSON request body
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty or blank body or malformed JSON, plus
    /// everything `create_channel` returns.
    pub fn create_channel_from_json(&self, body: &[u8]) -> Result<ChannelDocument> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::invalid_argument("channel request body cannot be empty"));
        }
        let options: ChannelOptions = serde_json::from_slice(body)
            .map_err(|e| Error::invalid_argument(format!("malformed channel request: {}", e)))?;
        self.create_channel(&options)
    }

    /// Fetch a channel
    pub fn get_channel(&self, name: &str) -> Result<ChannelDocument> {
        let config = self.registry.get(name)?;
        Ok(self.channel_document(&config))
    }

    /// Change a channel's mutable metadata
    pub fn update_channel(&self, name: &str, update: &ChannelUpdate) -> Result<ChannelDocument> {
        let config = self.registry.update(name, update)?;
        Ok(self.channel_document(&config))
    }

    /// Delete a channel and purge its items, returning how many were purged
    ///
    /// Appends serialize with the purge on the channel's lane: each lands
    /// before it (and is purged) or fails with `NotFound`.
    pub fn delete_channel(&self, name: &str) -> Result<usize> {
        let name = ChannelName::trim(name);
        self.registry.get(name)?;
        let (_, purged) = self
            .sequencer
            .purge(name, || self.registry.delete(name))?;
        info!(channel = name, purged, "Channel removed with its items");
        Ok(purged)
    }

    /// Every channel, ordered by name
    pub fn list_channels(&self) -> Result<Vec<ChannelDocument>> {
        Ok(self
            .registry
            .list()?
            .iter()
            .map(|config| self.channel_document(config))
            .collect())
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// Append an item
    ///
    /// # Errors
    ///
    /// - `PayloadTooLarge` above `max_payload_bytes`
    /// - `NotFound` for an unknown (or concurrently deleted) channel
    /// - `InvalidArgument` for an empty payload
    pub fn append_item(
        &self,
        channel: &str,
        payload: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<InsertedItemDocument> {
        if payload.len() > self.config.max_payload_bytes {
            return Err(Error::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_bytes,
            });
        }
        let config = self.registry.get(channel)?;
        let name = config.name;

        let item = self.sequencer.append(&name, payload, content_type, || {
            if self.registry.exists(name.as_str())? {
                Ok(())
            } else {
                Err(Error::channel_not_found(name.as_str()))
            }
        })?;

        Ok(InsertedItemDocument::new(
            &item,
            &self.links.channel_uri(name.as_str()),
            &self.links.item_uri(name.as_str(), &item.key),
        ))
    }

    fn respond(&self, item: Item) -> Result<ItemResponse> {
        let links = self.links.resolve(&item)?;
        Ok(ItemResponse { item, links })
    }

    /// Fetch one item with its live links
    pub fn get_item(&self, channel: &str, key: &SequenceKey) -> Result<ItemResponse> {
        let config = self.registry.get(channel)?;
        let item = self
            .sequencer
            .get(config.name.as_str(), key)?
            .ok_or_else(|| {
                Error::NotFound(format!("item {} not found in channel {}", key, config.name))
            })?;
        self.respond(item)
    }

    /// Fetch one item addressed by its URI path (`yyyy/MM/dd/HH/mm/ss/SSS/counter`)
    pub fn get_item_by_path(&self, channel: &str, path: &str) -> Result<ItemResponse> {
        let key = SequenceKey::from_path(path)?;
        self.get_item(channel, &key)
    }

    /// Newest item of a channel
    pub fn get_latest(&self, channel: &str) -> Result<ItemResponse> {
        let config = self.registry.get(channel)?;
        let item = self
            .sequencer
            .latest(config.name.as_str())?
            .ok_or_else(|| Error::NotFound(format!("channel {} has no items", config.name)))?;
        self.respond(item)
    }

    /// Oldest surviving item of a channel
    pub fn get_earliest(&self, channel: &str) -> Result<ItemResponse> {
        let config = self.registry.get(channel)?;
        let item = self
            .sequencer
            .earliest(config.name.as_str())?
            .ok_or_else(|| Error::NotFound(format!("channel {} has no items", config.name)))?;
        self.respond(item)
    }

    // ========================================================================
    // Pages
    // ========================================================================

    fn page(
        &self,
        channel: &str,
        self_uri: String,
        items: Vec<Item>,
        count: usize,
    ) -> PageDocument {
        let previous = items
            .first()
            .map(|first| self.links.walk_uri(channel, &first.key, Direction::Previous, count));
        let next = items
            .last()
            .map(|last| self.links.walk_uri(channel, &last.key, Direction::Next, count));
        PageDocument {
            links: PageLinks {
                self_link: self_uri.as_str().into(),
                previous: previous.as_deref().map(Into::into),
                next: next.as_deref().map(Into::into),
                uris: items
                    .iter()
                    .map(|item| self.links.item_uri(channel, &item.key))
                    .collect(),
            },
            items,
        }
    }

    fn walk_page(
        &self,
        channel: &str,
        key: &SequenceKey,
        direction: Direction,
        count: usize,
    ) -> Result<PageDocument> {
        let count = page_count(count)?;
        let config = self.registry.get(channel)?;
        let name = config.name.as_str();
        let items = self.sequencer.walk(name, key, direction, count)?;
        let self_uri = self.links.walk_uri(name, key, direction, count);
        Ok(self.page(name, self_uri, items, count))
    }

    /// Up to `count` items after `key`, ascending
    ///
    /// The page links `previous` from its first item and `next` from its
    /// last, each with the same count; an empty page has neither.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero count, `NotFound` for an unknown channel.
    pub fn get_next_n(
        &self,
        channel: &str,
        key: &SequenceKey,
        count: usize,
    ) -> Result<PageDocument> {
        self.walk_page(channel, key, Direction::Next, count)
    }

    /// Up to `count` items before `key`, ascending
    pub fn get_previous_n(
        &self,
        channel: &str,
        key: &SequenceKey,
        count: usize,
    ) -> Result<PageDocument> {
        self.walk_page(channel, key, Direction::Previous, count)
    }

    /// The `count` oldest surviving items, ascending
    pub fn get_earliest_n(&self, channel: &str, count: usize) -> Result<PageDocument> {
        let count = page_count(count)?;
        let config = self.registry.get(channel)?;
        let name = config.name.as_str();
        let items = self.sequencer.earliest_n(name, count)?;
        Ok(self.page(name, self.links.earliest_page_uri(name, count), items, count))
    }

    /// The `count` newest items, ascending
    pub fn get_latest_n(&self, channel: &str, count: usize) -> Result<PageDocument> {
        let count = page_count(count)?;
        let config = self.registry.get(channel)?;
        let name = config.name.as_str();
        let items = self.sequencer.latest_n(name, count)?;
        Ok(self.page(name, self.links.latest_page_uri(name, count), items, count))
    }

    /// Every item inserted during one UTC day, hour, minute or second
    ///
    /// `path_prefix` is `yyyy/MM/dd[/HH[/mm[/ss]]]`. The page always links the
    /// previous bucket (except at the epoch) and links the next bucket only
    /// once it has started.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a malformed prefix, `NotFound` for an unknown
    /// channel.
    pub fn query_time(&self, channel: &str, path_prefix: &str) -> Result<PageDocument> {
        let bucket = TimeBucket::parse(path_prefix)?;
        let config = self.registry.get(channel)?;
        let name = config.name.as_str();
        let items = self.sequencer.range(name, bucket.start(), bucket.end())?;

        let next = bucket.next();
        let next = (next.start() <= self.clock.now()).then(|| self.links.time_uri(name, &next));
        let previous = bucket
            .previous()
            .map(|previous| self.links.time_uri(name, &previous));

        Ok(PageDocument {
            links: PageLinks {
                self_link: self.links.time_uri(name, &bucket).as_str().into(),
                previous: previous.as_deref().map(Into::into),
                next: next.as_deref().map(Into::into),
                uris: items
                    .iter()
                    .map(|item| self.links.item_uri(name, &item.key))
                    .collect(),
            },
            items,
        })
    }

    // ========================================================================
    // Retention
    // ========================================================================

    /// Run one retention cycle now
    pub fn sweep_expired(&self) -> Result<SweepReport> {
        self.retention.sweep_once()
    }

    /// Start the background retention thread
    ///
    /// # Errors
    ///
    /// `Conflict` once the sweeper has been shut down.
    pub fn start_retention(&self) -> Result<JoinHandle<()>> {
        self.retention.start()
    }
}

fn page_count(count: usize) -> Result<usize> {
    if count == 0 {
        return Err(Error::invalid_argument("page count must be at least 1"));
    }
    Ok(count.min(MAX_PAGE_COUNT))
}

impl Drop for Hub {
    fn drop(&mut self) {
        self.retention.shutdown();
    }
}
