//! Item sequencer
//!
//! Assigns every appended item a `(timestamp, counter)` key that is strictly
//! greater than any key the channel has ever used, and answers ordered
//! lookups over the channel's item log.
//!
//! # Lanes
//!
//! Each channel has a lane: a mutex around its cached high-water mark, held
//! in a `DashMap`. Appends to one channel serialize on its lane; appends to
//! different channels never touch the same lock. A lane is released again
//! when a purge or a failed precondition leaves it unused; the next append
//! reloads the persisted mark.
//!
//! # Durability of the high-water mark
//!
//! The mark is written to the store *before* the item it covers. After a
//! restart the lane reloads the mark, so a key is never handed out twice
//! even if the item write itself failed.

use std::ops::Bound;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use channelhub_core::{
    ChannelName, Clock, Direction, Entry, Error, Item, OrderedStore, Partition, Result,
    SequenceKey, StoreKey, Timestamp, DEFAULT_CONTENT_TYPE,
};

#[derive(Debug, Default)]
struct Lane {
    high_water: Option<SequenceKey>,
    loaded: bool,
}

/// Per-channel ordered item log
pub struct ItemSequencer {
    store: Arc<dyn OrderedStore>,
    clock: Arc<dyn Clock>,
    lanes: DashMap<String, Arc<Mutex<Lane>>>,
}

impl ItemSequencer {
    /// Create a sequencer over `store`
    pub fn new(store: Arc<dyn OrderedStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            lanes: DashMap::new(),
        }
    }

    fn lane(&self, channel: &str) -> Arc<Mutex<Lane>> {
        if let Some(lane) = self.lanes.get(channel) {
            return Arc::clone(lane.value());
        }
        Arc::clone(self.lanes.entry(channel.to_string()).or_default().value())
    }

    /// Drop `channel`'s lane unless another caller still holds a handle to it
    ///
    /// Handles are only cloned out of the map under its shard lock, which
    /// `remove_if` also holds, so the count cannot grow during the check.
    fn release(&self, channel: &str, lane: &Arc<Mutex<Lane>>) {
        self.lanes.remove_if(channel, |_, current| {
            Arc::ptr_eq(current, lane) && Arc::strong_count(current) == 2
        });
    }

    /// Number of channels with a live lane
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    fn high_water(&self, lane: &mut Lane, channel: &str) -> Result<Option<SequenceKey>> {
        if !lane.loaded {
            lane.high_water = match self.store.get(&StoreKey::mark(channel))? {
                Some(bytes) => Some(SequenceKey::from_bytes(&bytes)?),
                None => None,
            };
            lane.loaded = true;
        }
        Ok(lane.high_water)
    }

    /// Append an item to `channel`
    ///
    /// `precondition` runs while the channel's lane is held, before a key is
    /// assigned; the hub uses it to confirm the channel still exists.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty payload
    /// - whatever `precondition` returns
    /// - `StorageFailure` if the mark or the item cannot be written
    pub fn append<F>(
        &self,
        channel: &ChannelName,
        payload: Vec<u8>,
        content_type: Option<&str>,
        precondition: F,
    ) -> Result<Item>
    where
        F: FnOnce() -> Result<()>,
    {
        if payload.is_empty() {
            return Err(Error::invalid_argument("item payload cannot be empty"));
        }
        let content_type = match content_type.map(str::trim) {
            Some(ct) if !ct.is_empty() => ct.to_string(),
            _ => DEFAULT_CONTENT_TYPE.to_string(),
        };

        let lane = self.lane(channel.as_str());
        let mut state = lane.lock();
        if let Err(e) = precondition() {
            drop(state);
            self.release(channel.as_str(), &lane);
            return Err(e);
        }

        let high_water = self.high_water(&mut state, channel.as_str())?;
        let key = SequenceKey::next_after(high_water, self.clock.now());
        let item = Item {
            channel: channel.clone(),
            key,
            content_type,
            payload,
        };
        let encoded = bincode::serialize(&item)?;

        self.store
            .put(StoreKey::mark(channel.as_str()), key.to_bytes().to_vec())?;
        state.high_water = Some(key);
        self.store.put(StoreKey::item(channel.as_str(), &key), encoded)?;

        debug!(channel = %channel, key = %key, bytes = item.len(), "Item appended");
        Ok(item)
    }

    /// Item stored under `key`, if any
    pub fn get(&self, channel: &str, key: &SequenceKey) -> Result<Option<Item>> {
        match self.store.get(&StoreKey::item(channel, key))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// The item strictly before or after `key` in the channel's order
    ///
    /// `key` itself need not exist.
    pub fn adjacent(
        &self,
        channel: &str,
        key: &SequenceKey,
        direction: Direction,
    ) -> Result<Option<Item>> {
        self.store
            .neighbor(&StoreKey::item(channel, key), direction)?
            .map(|(_, bytes)| decode(&bytes))
            .transpose()
    }

    /// Item with the greatest key
    pub fn latest(&self, channel: &str) -> Result<Option<Item>> {
        self.store
            .last(&Partition::items(channel))?
            .map(|(_, bytes)| decode(&bytes))
            .transpose()
    }

    /// Item with the smallest key
    pub fn earliest(&self, channel: &str) -> Result<Option<Item>> {
        self.store
            .first(&Partition::items(channel))?
            .map(|(_, bytes)| decode(&bytes))
            .transpose()
    }

    fn collect_walk(
        &self,
        channel: &str,
        from: Bound<&[u8]>,
        direction: Direction,
        count: usize,
    ) -> Result<Vec<Item>> {
        let mut items = decode_all(self.store.walk(
            &Partition::items(channel),
            from,
            direction,
            count,
        )?)?;
        if direction == Direction::Previous {
            items.reverse();
        }
        Ok(items)
    }

    /// Up to `count` items strictly after (`Next`) or before (`Previous`) `from`
    ///
    /// Either way the items come back in ascending key order, the ones
    /// nearest to `from` included first. `from` itself need not exist.
    pub fn walk(
        &self,
        channel: &str,
        from: &SequenceKey,
        direction: Direction,
        count: usize,
    ) -> Result<Vec<Item>> {
        let from = from.to_bytes();
        self.collect_walk(channel, Bound::Excluded(&from[..]), direction, count)
    }

    /// Up to `count` oldest items, ascending
    pub fn earliest_n(&self, channel: &str, count: usize) -> Result<Vec<Item>> {
        self.collect_walk(channel, Bound::Unbounded, Direction::Next, count)
    }

    /// Up to `count` newest items, ascending
    pub fn latest_n(&self, channel: &str, count: usize) -> Result<Vec<Item>> {
        self.collect_walk(channel, Bound::Unbounded, Direction::Previous, count)
    }

    /// Items inserted in `[start, end)`, ascending
    pub fn range(&self, channel: &str, start: Timestamp, end: Timestamp) -> Result<Vec<Item>> {
        let start = SequenceKey::new(start, 0).to_bytes();
        let end = SequenceKey::new(end, 0).to_bytes();
        decode_all(self.store.range(&Partition::items(channel), &start, &end)?)
    }

    /// Up to `limit` keys from the oldest end, ascending
    pub fn oldest(&self, channel: &str, limit: usize) -> Result<Vec<SequenceKey>> {
        self.store
            .scan(&Partition::items(channel), limit)?
            .into_iter()
            .map(|(key, _)| SequenceKey::from_bytes(&key.suffix))
            .collect()
    }

    /// Remove one item; `false` if it was already gone
    pub fn evict(&self, channel: &str, key: &SequenceKey) -> Result<bool> {
        Ok(self.store.delete(&StoreKey::item(channel, key))?.is_some())
    }

    /// Run `before` under the channel's lane, then drop every item
    ///
    /// Appends waiting on the lane observe whatever `before` changed. The
    /// high-water mark is kept, so a recreated channel never reuses a key.
    /// The lane itself is released whether or not `before` succeeds.
    pub fn purge<T, F>(&self, channel: &str, before: F) -> Result<(T, usize)>
    where
        F: FnOnce() -> Result<T>,
    {
        let lane = self.lane(channel);
        let guard = lane.lock();
        let outcome = before().and_then(|value| {
            let removed = self.store.delete_partition(&Partition::items(channel))?;
            Ok((value, removed))
        });
        drop(guard);
        self.release(channel, &lane);

        let (value, removed) = outcome?;
        debug!(channel, removed, "Channel items purged");
        Ok((value, removed))
    }
}

fn decode(bytes: &[u8]) -> Result<Item> {
    Ok(bincode::deserialize(bytes)?)
}

fn decode_all(entries: Vec<Entry>) -> Result<Vec<Item>> {
    entries.iter().map(|(_, bytes)| decode(bytes)).collect()
}
