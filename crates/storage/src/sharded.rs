//! Sharded storage
//!
//! Replaces the single RwLock + BTreeMap with DashMap + per-partition BTreeMap.
//!
//! # Design
//!
//! - DashMap: keyed by `Partition` (`(space, channel)`), lock-striped
//! - BTreeMap per shard: ordered by key suffix for range scans
//! - Per-channel: appends to different channels never contend
//!
//! # Thread Safety
//!
//! All operations are thread-safe:
//! - get()/neighbor(): take only the target shard's read guard
//! - put()/insert_if_absent(): take only the target shard's entry guard
//! - No operation ever holds two shard guards at once

use std::collections::btree_map::Entry as MapEntry;
use std::collections::BTreeMap;
use std::ops::Bound;

use dashmap::DashMap;

use channelhub_core::{Direction, Entry, KeySpace, OrderedStore, Partition, Result, StoreKey};

/// One partition's ordered data
#[derive(Debug, Default)]
pub struct Shard {
    /// Suffix → encoded record
    pub(crate) data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of keys in this shard
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Sharded storage - DashMap by partition, BTreeMap within
///
/// # Example
///
/// ```ignore
/// use channelhub_storage::ShardedStore;
/// use std::sync::Arc;
///
/// let store: Arc<dyn OrderedStore> = Arc::new(ShardedStore::new());
/// ```
#[derive(Debug, Default)]
pub struct ShardedStore {
    shards: DashMap<Partition, Shard>,
}

impl ShardedStore {
    /// Create new sharded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with expected number of partitions
    pub fn with_capacity(partitions: usize) -> Self {
        Self {
            shards: DashMap::with_capacity(partitions),
        }
    }

    /// Get number of shards (partitions that have ever been written)
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Get total number of entries across all shards
    pub fn total_entries(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    fn entry_at(partition: &Partition, suffix: &[u8], value: &[u8]) -> Entry {
        (
            StoreKey {
                partition: partition.clone(),
                suffix: suffix.to_vec(),
            },
            value.to_vec(),
        )
    }
}

impl OrderedStore for ShardedStore {
    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        Ok(self
            .shards
            .get(&key.partition)
            .and_then(|shard| shard.data.get(&key.suffix).cloned()))
    }

    fn put(&self, key: StoreKey, value: Vec<u8>) -> Result<()> {
        let StoreKey { partition, suffix } = key;
        self.shards
            .entry(partition)
            .or_default()
            .data
            .insert(suffix, value);
        Ok(())
    }

    fn insert_if_absent(&self, key: StoreKey, value: Vec<u8>) -> Result<bool> {
        let StoreKey { partition, suffix } = key;
        let mut shard = self.shards.entry(partition).or_default();
        match shard.data.entry(suffix) {
            MapEntry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
            MapEntry::Occupied(_) => Ok(false),
        }
    }

    fn compare_and_swap(&self, key: &StoreKey, expected: &[u8], value: Vec<u8>) -> Result<bool> {
        let Some(mut shard) = self.shards.get_mut(&key.partition) else {
            return Ok(false);
        };
        match shard.data.get_mut(&key.suffix) {
            Some(current) if current.as_slice() == expected => {
                *current = value;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        let removed = {
            let Some(mut shard) = self.shards.get_mut(&key.partition) else {
                return Ok(None);
            };
            shard.data.remove(&key.suffix)
        };
        if removed.is_some() {
            // Emptiness is rechecked under the map's lock, so a racing put keeps its shard
            self.shards
                .remove_if(&key.partition, |_, shard| shard.is_empty());
        }
        Ok(removed)
    }

    fn neighbor(&self, key: &StoreKey, direction: Direction) -> Result<Option<Entry>> {
        let Some(shard) = self.shards.get(&key.partition) else {
            return Ok(None);
        };
        let suffix = key.suffix.as_slice();
        let found = match direction {
            Direction::Previous => shard
                .data
                .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(suffix)))
                .next_back(),
            Direction::Next => shard
                .data
                .range::<[u8], _>((Bound::Excluded(suffix), Bound::Unbounded))
                .next(),
        };
        Ok(found.map(|(k, v)| Self::entry_at(&key.partition, k, v)))
    }

    fn first(&self, partition: &Partition) -> Result<Option<Entry>> {
        Ok(self.shards.get(partition).and_then(|shard| {
            shard
                .data
                .iter()
                .next()
                .map(|(k, v)| Self::entry_at(partition, k, v))
        }))
    }

    fn last(&self, partition: &Partition) -> Result<Option<Entry>> {
        Ok(self.shards.get(partition).and_then(|shard| {
            shard
                .data
                .iter()
                .next_back()
                .map(|(k, v)| Self::entry_at(partition, k, v))
        }))
    }

    fn scan(&self, partition: &Partition, limit: usize) -> Result<Vec<Entry>> {
        Ok(self
            .shards
            .get(partition)
            .map(|shard| {
                shard
                    .data
                    .iter()
                    .take(limit)
                    .map(|(k, v)| Self::entry_at(partition, k, v))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn walk(
        &self,
        partition: &Partition,
        from: Bound<&[u8]>,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Entry>> {
        let Some(shard) = self.shards.get(partition) else {
            return Ok(Vec::new());
        };
        let entry = |(k, v): (&Vec<u8>, &Vec<u8>)| Self::entry_at(partition, k, v);
        let entries = match direction {
            Direction::Next => shard
                .data
                .range::<[u8], _>((from, Bound::Unbounded))
                .take(limit)
                .map(entry)
                .collect(),
            Direction::Previous => shard
                .data
                .range::<[u8], _>((Bound::Unbounded, from))
                .rev()
                .take(limit)
                .map(entry)
                .collect(),
        };
        Ok(entries)
    }

    fn range(&self, partition: &Partition, start: &[u8], end: &[u8]) -> Result<Vec<Entry>> {
        if start >= end {
            return Ok(Vec::new());
        }
        Ok(self
            .shards
            .get(partition)
            .map(|shard| {
                shard
                    .data
                    .range::<[u8], _>((Bound::Included(start), Bound::Excluded(end)))
                    .map(|(k, v)| Self::entry_at(partition, k, v))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn scan_space(&self, space: KeySpace) -> Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .shards
            .iter()
            .filter(|shard| shard.key().space == space)
            .flat_map(|shard| {
                let partition = shard.key();
                shard
                    .value()
                    .data
                    .iter()
                    .map(|(k, v)| Self::entry_at(partition, k, v))
                    .collect::<Vec<_>>()
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    fn delete_partition(&self, partition: &Partition) -> Result<usize> {
        Ok(self
            .shards
            .remove(partition)
            .map(|(_, shard)| shard.len())
            .unwrap_or(0))
    }
}
