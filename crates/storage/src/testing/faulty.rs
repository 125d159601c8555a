//! Fault-injecting store wrapper
//!
//! `FaultyStore` forwards every call to an inner store unless the current
//! `FaultPlan` says the call should fail. Planned failures surface as
//! `Error::StorageFailure`, the same error a real backend reports.

use std::collections::HashSet;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use channelhub_core::{
    Direction, Entry, Error, KeySpace, OrderedStore, Partition, Result, StoreKey,
};

/// Which calls should fail next
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    /// Number of upcoming `delete` calls to fail
    pub deletes: usize,
    /// Number of upcoming `put` / `insert_if_absent` calls to fail
    pub puts: usize,
    /// Channels whose deletes always fail
    pub channels: HashSet<String>,
}

/// Store wrapper that fails on demand
pub struct FaultyStore {
    inner: Arc<dyn OrderedStore>,
    plan: Mutex<FaultPlan>,
}

impl FaultyStore {
    /// Wrap a shared store
    pub fn new(inner: Arc<dyn OrderedStore>) -> Self {
        Self {
            inner,
            plan: Mutex::new(FaultPlan::default()),
        }
    }

    /// Wrap an owned store
    pub fn wrap<S: OrderedStore + 'static>(inner: S) -> Self {
        Self::new(Arc::new(inner))
    }

    /// Fail the next `n` deletes
    pub fn fail_next_deletes(&self, n: usize) {
        self.plan.lock().deletes = n;
    }

    /// Fail the next `n` writes
    pub fn fail_next_puts(&self, n: usize) {
        self.plan.lock().puts = n;
    }

    /// Fail every delete in `channel` until cleared
    pub fn fail_deletes_for(&self, channel: &str) {
        self.plan.lock().channels.insert(channel.to_string());
    }

    /// Drop all planned faults
    pub fn clear(&self) {
        *self.plan.lock() = FaultPlan::default();
    }

    /// Snapshot of the current plan
    pub fn plan(&self) -> FaultPlan {
        self.plan.lock().clone()
    }

    fn check_put(&self, key: &StoreKey) -> Result<()> {
        let mut plan = self.plan.lock();
        if plan.puts > 0 {
            plan.puts -= 1;
            debug!(channel = key.channel_name(), "injected put failure");
            return Err(Error::storage(format!(
                "injected put failure for {}",
                key.channel_name()
            )));
        }
        Ok(())
    }

    fn check_delete(&self, channel: &str) -> Result<()> {
        let mut plan = self.plan.lock();
        if plan.channels.contains(channel) {
            debug!(channel, "injected delete failure");
            return Err(Error::storage(format!(
                "injected delete failure for {}",
                channel
            )));
        }
        if plan.deletes > 0 {
            plan.deletes -= 1;
            debug!(channel, "injected delete failure");
            return Err(Error::storage(format!(
                "injected delete failure for {}",
                channel
            )));
        }
        Ok(())
    }
}

impl OrderedStore for FaultyStore {
    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: StoreKey, value: Vec<u8>) -> Result<()> {
        self.check_put(&key)?;
        self.inner.put(key, value)
    }

    fn insert_if_absent(&self, key: StoreKey, value: Vec<u8>) -> Result<bool> {
        self.check_put(&key)?;
        self.inner.insert_if_absent(key, value)
    }

    fn compare_and_swap(&self, key: &StoreKey, expected: &[u8], value: Vec<u8>) -> Result<bool> {
        self.check_put(key)?;
        self.inner.compare_and_swap(key, expected, value)
    }

    fn delete(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        self.check_delete(key.channel_name())?;
        self.inner.delete(key)
    }

    fn neighbor(&self, key: &StoreKey, direction: Direction) -> Result<Option<Entry>> {
        self.inner.neighbor(key, direction)
    }

    fn first(&self, partition: &Partition) -> Result<Option<Entry>> {
        self.inner.first(partition)
    }

    fn last(&self, partition: &Partition) -> Result<Option<Entry>> {
        self.inner.last(partition)
    }

    fn scan(&self, partition: &Partition, limit: usize) -> Result<Vec<Entry>> {
        self.inner.scan(partition, limit)
    }

    fn walk(
        &self,
        partition: &Partition,
        from: Bound<&[u8]>,
        direction: Direction,
        limit: usize,
    ) -> Result<Vec<Entry>> {
        self.inner.walk(partition, from, direction, limit)
    }

    fn range(&self, partition: &Partition, start: &[u8], end: &[u8]) -> Result<Vec<Entry>> {
        self.inner.range(partition, start, end)
    }

    fn scan_space(&self, space: KeySpace) -> Result<Vec<Entry>> {
        self.inner.scan_space(space)
    }

    fn delete_partition(&self, partition: &Partition) -> Result<usize> {
        self.check_delete(&partition.channel)?;
        self.inner.delete_partition(partition)
    }
}
