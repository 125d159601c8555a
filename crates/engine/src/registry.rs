//! Channel registry
//!
//! Owns every channel record. Names are reserved with the store's
//! insert-if-absent primitive, so of any number of concurrent creators of
//! one name exactly one wins and the rest see `Conflict`. Metadata updates
//! are compare-and-swap on the encoded record.

use std::sync::Arc;

use tracing::{debug, info};

use channelhub_core::{
    ChannelConfig, ChannelName, ChannelOptions, ChannelUpdate, Clock, Error, KeySpace,
    OrderedStore, Result, StoreKey,
};

/// Attempts an update makes before giving up with `Conflict`
pub const UPDATE_ATTEMPTS: usize = 3;

/// Registry of channel records
pub struct ChannelRegistry {
    store: Arc<dyn OrderedStore>,
    clock: Arc<dyn Clock>,
    default_ttl_days: u64,
}

impl ChannelRegistry {
    /// Create a registry over `store`
    pub fn new(store: Arc<dyn OrderedStore>, clock: Arc<dyn Clock>, default_ttl_days: u64) -> Self {
        Self {
            store,
            clock,
            default_ttl_days,
        }
    }

    /// Validate `options` and reserve the channel name
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a bad name or option
    /// - `Conflict` if a channel with the trimmed name exists
    pub fn create(&self, options: &ChannelOptions) -> Result<ChannelConfig> {
        let config =
            ChannelConfig::from_options(options, self.clock.now(), self.default_ttl_days)?;
        let encoded = bincode::serialize(&config)?;

        let reserved = self
            .store
            .insert_if_absent(StoreKey::channel(config.name.as_str()), encoded)?;
        if !reserved {
            return Err(Error::Conflict(format!(
                "channel {} already exists",
                config.name
            )));
        }

        info!(
            channel = %config.name,
            ttl_millis = config.ttl_millis,
            storage = %config.effective_storage(),
            "Channel created"
        );
        Ok(config)
    }

    /// Look up a channel by exact (case-sensitive, trimmed) name
    pub fn find(&self, name: &str) -> Result<Option<ChannelConfig>> {
        match self.store.get(&StoreKey::channel(ChannelName::trim(name)))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Look up a channel, failing with `NotFound` when absent
    pub fn get(&self, name: &str) -> Result<ChannelConfig> {
        self.find(name)?
            .ok_or_else(|| Error::channel_not_found(ChannelName::trim(name)))
    }

    /// Whether a channel record exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.store.get(&StoreKey::channel(ChannelName::trim(name)))?.is_some())
    }

    /// Every channel, ordered by name
    pub fn list(&self) -> Result<Vec<ChannelConfig>> {
        self.store
            .scan_space(KeySpace::Channel)?
            .into_iter()
            .map(|(_, bytes)| decode(&bytes))
            .collect()
    }

    /// Apply `update` to a channel's mutable metadata
    ///
    /// # Errors
    ///
    /// - `NotFound` if the channel does not exist (or is deleted mid-update)
    /// - `InvalidArgument` for a bad option
    /// - `Conflict` if concurrent writers win every attempt
    pub fn update(&self, name: &str, update: &ChannelUpdate) -> Result<ChannelConfig> {
        let name = ChannelName::trim(name);
        let key = StoreKey::channel(name);

        for attempt in 1..=UPDATE_ATTEMPTS {
            let current = self
                .store
                .get(&key)?
                .ok_or_else(|| Error::channel_not_found(name))?;
            let next = decode(&current)?.apply(update)?;
            let encoded = bincode::serialize(&next)?;

            if self.store.compare_and_swap(&key, &current, encoded)? {
                info!(channel = %next.name, ttl_millis = next.ttl_millis, "Channel updated");
                return Ok(next);
            }
            debug!(channel = name, attempt, "Channel update lost a race, retrying");
        }

        Err(Error::Conflict(format!(
            "channel {} was modified concurrently; update abandoned after {} attempts",
            name,
            UPDATE_ATTEMPTS
        )))
    }

    /// Remove a channel record, returning it
    ///
    /// Items are not touched here; the sequencer purges them.
    pub fn delete(&self, name: &str) -> Result<ChannelConfig> {
        match self.store.delete(&StoreKey::channel(ChannelName::trim(name)))? {
            Some(bytes) => {
                let config = decode(&bytes)?;
                info!(channel = %config.name, "Channel deleted");
                Ok(config)
            }
            None => Err(Error::channel_not_found(ChannelName::trim(name))),
        }
    }
}

fn decode(bytes: &[u8]) -> Result<ChannelConfig> {
    Ok(bincode::deserialize(bytes)?)
}
