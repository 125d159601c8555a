//! Storage layer for channelhub
//!
//! This crate implements the `OrderedStore` backends:
//! - UnifiedStore: one BTreeMap under a parking_lot RwLock
//! - ShardedStore: DashMap of per-partition BTreeMaps
//! - testing::FaultyStore: wrapper that injects write/delete failures
//!
//! # Sharding
//!
//! The `ShardedStore` keys its shards by `(space, channel)`:
//! - Appends to different channels never contend
//! - Reads only lock the shard they touch
//! - insert-if-absent is atomic under the shard's entry lock

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sharded;
pub mod testing;
pub mod unified;

pub use sharded::{Shard, ShardedStore};
pub use unified::UnifiedStore;
