//! Ordered key-value store abstraction
//!
//! The hub needs very little from its durable layer: point reads and writes,
//! an atomic insert-if-absent, a compare-and-swap, and ordered range scans
//! within a partition. `OrderedStore` captures exactly that so the engine can
//! run on top of any backend (in-memory BTreeMap, sharded maps, or an external
//! column store behind an adapter) without changes.
//!
//! ## Key layout
//!
//! Keys are `(space, channel, suffix)` and order lexicographically in that
//! order. A `Partition` is one `(space, channel)` pair; all range operations
//! stay inside a single partition.
//!
//! | space     | suffix                  | value                       |
//! |-----------|-------------------------|-----------------------------|
//! | `Channel` | empty                   | bincode `ChannelConfig`     |
//! | `Mark`    | empty                   | 16-byte high-water key      |
//! | `Item`    | 16-byte `SequenceKey`   | bincode `Item`              |

use std::ops::Bound;

use crate::contract::SequenceKey;
use crate::error::Result;

/// Top-level key namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeySpace {
    /// Channel metadata records
    Channel = 0,
    /// Per-channel sequencer high-water marks
    Mark = 1,
    /// Item log entries
    Item = 2,
}

/// One `(space, channel)` range of the key space
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Partition {
    /// Key namespace
    pub space: KeySpace,
    /// Owning channel name
    pub channel: String,
}

impl Partition {
    /// Create a partition
    pub fn new(space: KeySpace, channel: impl Into<String>) -> Self {
        Self {
            space,
            channel: channel.into(),
        }
    }

    /// The item log partition of a channel
    pub fn items(channel: impl Into<String>) -> Self {
        Self::new(KeySpace::Item, channel)
    }

    /// Smallest key inside this partition (inclusive)
    pub fn lower_bound(&self) -> StoreKey {
        StoreKey {
            partition: self.clone(),
            suffix: Vec::new(),
        }
    }

    /// Smallest key of the next partition (exclusive upper bound)
    ///
    /// `channel + "\0"` is the immediate lexicographic successor of `channel`,
    /// so no other channel name falls between the two bounds.
    pub fn upper_bound(&self) -> StoreKey {
        let mut channel = self.channel.clone();
        channel.push('\0');
        StoreKey {
            partition: Partition::new(self.space, channel),
            suffix: Vec::new(),
        }
    }

    /// Key with the given suffix inside this partition
    pub fn key_at(&self, suffix: &[u8]) -> StoreKey {
        StoreKey {
            partition: self.clone(),
            suffix: suffix.to_vec(),
        }
    }

    /// Whether `key` belongs to this partition
    #[inline]
    pub fn contains(&self, key: &StoreKey) -> bool {
        key.partition == *self
    }
}

/// Composite key: partition plus an order-preserving suffix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreKey {
    /// Partition this key lives in
    pub partition: Partition,
    /// Order-preserving suffix (empty for singleton records)
    pub suffix: Vec<u8>,
}

impl StoreKey {
    /// Key of a channel's metadata record
    pub fn channel(name: &str) -> Self {
        Partition::new(KeySpace::Channel, name).lower_bound()
    }

    /// Key of a channel's sequencer high-water mark
    pub fn mark(name: &str) -> Self {
        Partition::new(KeySpace::Mark, name).lower_bound()
    }

    /// Key of one item in a channel's log
    pub fn item(name: &str, key: &SequenceKey) -> Self {
        StoreKey {
            partition: Partition::items(name),
            suffix: key.to_bytes().to_vec(),
        }
    }

    /// The channel this key belongs to
    #[inline]
    pub fn channel_name(&self) -> &str {
        &self.partition.channel
    }
}

/// A stored key with its value
pub type Entry = (StoreKey, Vec<u8>);

/// Direction of an adjacency lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Strictly smaller keys
    Previous,
    /// Strictly greater keys
    Next,
}

/// Storage abstraction for the hub
///
/// Thread safety: all methods must be safe to call concurrently from multiple
/// threads. Every single-key method is atomic: a concurrent reader observes
/// either the old value or the new one, never a partial value.
pub trait OrderedStore: Send + Sync {
    /// Read the value stored at `key`
    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>>;

    /// Write `value` at `key`, replacing any previous value
    fn put(&self, key: StoreKey, value: Vec<u8>) -> Result<()>;

    /// Write `value` at `key` only if the key is absent
    ///
    /// Returns `true` if this call inserted the value. Of any number of
    /// concurrent callers for the same key, at most one observes `true`.
    fn insert_if_absent(&self, key: StoreKey, value: Vec<u8>) -> Result<bool>;

    /// Replace the value at `key` only if it currently equals `expected`
    ///
    /// Returns `false` if the key is absent or holds a different value.
    fn compare_and_swap(&self, key: &StoreKey, expected: &[u8], value: Vec<u8>) -> Result<bool>;

    /// Remove `key`, returning the value it held
    fn delete(&self, key: &StoreKey) -> Result<Option<Vec<u8>>>;

    /// The entry strictly before or after `key` within the same partition
    fn neighbor(&self, key: &StoreKey, direction: Direction) -> Result<Option<Entry>>;

    /// Smallest entry of a partition
    fn first(&self, partition: &Partition) -> Result<Option<Entry>>;

    /// Greatest entry of a partition
    fn last(&self, partition: &Partition) -> Result<Option<Entry>>;

    /// Up to `limit` entries of a partition in ascending key order
    fn scan(&self, partition: &Partition, limit: usize) -> Result<Vec<Entry>>;

    /// Up to `limit` entries of a partition, walking away from `from`
    ///
    /// `from` is a suffix bound on the side the walk starts from.
    /// `Bound::Unbounded` starts at the oldest end for `Next` and at the
    /// newest end for `Previous`. Entries come back nearest-first.
    fn walk(
        &self,
        partition: &Partition,
        from: Bound<&[u8]>,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Entry>>;

    /// Entries of a partition whose suffix lies in `[start, end)`, ascending
    ///
    /// An empty or inverted range yields no entries.
    fn range(&self, partition: &Partition, start: &[u8], end: &[u8]) -> Result<Vec<Entry>>;

    /// Every entry of a key space, in ascending key order
    fn scan_space(&self, space: KeySpace) -> Result<Vec<Entry>>;

    /// Remove every entry of a partition, returning how many were removed
    fn delete_partition(&self, partition: &Partition) -> Result<usize>;
}
