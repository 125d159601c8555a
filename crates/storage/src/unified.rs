//! UnifiedStore: BTreeMap-backed ordered store
//!
//! This module implements the OrderedStore trait using:
//! - `BTreeMap<StoreKey, Vec<u8>>` for ordered key storage
//! - `parking_lot::RwLock` for thread-safe access
//!
//! # Design Notes
//!
//! - **One lock**: every write takes the single write lock, so insert-if-absent
//!   and compare-and-swap are trivially atomic
//! - **Partition-bounded ranges**: adjacency and scans use the partition's
//!   lower/upper bound keys so they never walk into another channel
//!
//! Simple and predictable; `ShardedStore` is the choice when many channels
//! take writes at the same time.

use std::collections::btree_map::Entry as MapEntry;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;

use channelhub_core::{Direction, Entry, KeySpace, OrderedStore, Partition, Result, StoreKey};

/// Ordered storage backend using BTreeMap with RwLock
#[derive(Debug, Default)]
pub struct UnifiedStore {
    /// The main data store: ordered map from StoreKey to encoded record
    data: Arc<RwLock<BTreeMap<StoreKey, Vec<u8>>>>,
}

impl UnifiedStore {
    /// Create a new empty UnifiedStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of keys across all partitions
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

fn cloned((key, value): (&StoreKey, &Vec<u8>)) -> Entry {
    (key.clone(), value.clone())
}

impl OrderedStore for UnifiedStore {
    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: StoreKey, value: Vec<u8>) -> Result<()> {
        self.data.write().insert(key, value);
        Ok(())
    }

    fn insert_if_absent(&self, key: StoreKey, value: Vec<u8>) -> Result<bool> {
        match self.data.write().entry(key) {
            MapEntry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
            MapEntry::Occupied(_) => Ok(false),
        }
    }

    fn compare_and_swap(&self, key: &StoreKey, expected: &[u8], value: Vec<u8>) -> Result<bool> {
        let mut data = self.data.write();
        match data.get_mut(key) {
            Some(current) if current.as_slice() == expected => {
                *current = value;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        Ok(self.data.write().remove(key))
    }

    fn neighbor(&self, key: &StoreKey, direction: Direction) -> Result<Option<Entry>> {
        let data = self.data.read();
        let partition = &key.partition;
        let found = match direction {
            Direction::Previous => {
                let lower = partition.lower_bound();
                data.range((Bound::Included(&lower), Bound::Excluded(key)))
                    .next_back()
                    .map(cloned)
            }
            Direction::Next => {
                let upper = partition.upper_bound();
                data.range((Bound::Excluded(key), Bound::Excluded(&upper)))
                    .next()
                    .map(cloned)
            }
        };
        Ok(found)
    }

    fn first(&self, partition: &Partition) -> Result<Option<Entry>> {
        let data = self.data.read();
        Ok(data
            .range(partition.lower_bound()..partition.upper_bound())
            .next()
            .map(cloned))
    }

    fn last(&self, partition: &Partition) -> Result<Option<Entry>> {
        let data = self.data.read();
        Ok(data
            .range(partition.lower_bound()..partition.upper_bound())
            .next_back()
            .map(cloned))
    }

    fn scan(&self, partition: &Partition, limit: usize) -> Result<Vec<Entry>> {
        let data = self.data.read();
        Ok(data
            .range(partition.lower_bound()..partition.upper_bound())
            .take(limit)
            .map(cloned)
            .collect())
    }

    fn walk(
        &self,
        partition: &Partition,
        from: Bound<&[u8]>,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Entry>> {
        let data = self.data.read();
        let from = match from {
            Bound::Included(suffix) => Bound::Included(partition.key_at(suffix)),
            Bound::Excluded(suffix) => Bound::Excluded(partition.key_at(suffix)),
            Bound::Unbounded => Bound::Unbounded,
        };
        let entries = match direction {
            Direction::Next => {
                let start = match from {
                    Bound::Unbounded => Bound::Included(partition.lower_bound()),
                    bound => bound,
                };
                data.range((start, Bound::Excluded(partition.upper_bound())))
                    .take(limit)
                    .map(cloned)
                    .collect()
            }
            Direction::Previous => {
                let end = match from {
                    Bound::Unbounded => Bound::Excluded(partition.upper_bound()),
                    bound => bound,
                };
                data.range((Bound::Included(partition.lower_bound()), end))
                    .rev()
                    .take(limit)
                    .map(cloned)
                    .collect()
            }
        };
        Ok(entries)
    }

    fn range(&self, partition: &Partition, start: &[u8], end: &[u8]) -> Result<Vec<Entry>> {
        if start >= end {
            return Ok(Vec::new());
        }
        let data = self.data.read();
        Ok(data
            .range(partition.key_at(start)..partition.key_at(end))
            .map(cloned)
            .collect())
    }

    fn scan_space(&self, space: KeySpace) -> Result<Vec<Entry>> {
        let data = self.data.read();
        let lower = Partition::new(space, String::new()).lower_bound();
        Ok(data
            .range(lower..)
            .take_while(|(key, _)| key.partition.space == space)
            .map(cloned)
            .collect())
    }

    fn delete_partition(&self, partition: &Partition) -> Result<usize> {
        let mut data = self.data.write();
        let keys: Vec<StoreKey> = data
            .range(partition.lower_bound()..partition.upper_bound())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            data.remove(key);
        }
        Ok(keys.len())
    }
}
