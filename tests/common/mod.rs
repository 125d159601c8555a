//! Shared test utilities for the hub integration suite.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::{Arc, Once};
use std::time::Duration;

pub use channelhub::{
    ChannelOptions, ChannelUpdate, Error, Hub, HubConfig, ManualClock, OrderedStore, SequenceKey,
    ShardedStore, Timestamp, UnifiedStore, MAX_PAGE_COUNT,
};
pub use channelhub_storage::testing::FaultyStore;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// 2013-06-25T18:03:54.123Z
pub const START_MILLIS: u64 = 1_372_183_434_123;

pub const BASE_URI: &str = "http://hub.test";

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (visible with `--nocapture`).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .try_init();
    });
}

// ============================================================================
// TestHub - hub over an in-memory store with a hand-driven clock
// ============================================================================

/// A hub plus handles to its clock and store.
pub struct TestHub {
    pub hub: Hub,
    pub clock: Arc<ManualClock>,
    pub store: Arc<FaultyStore>,
}

impl TestHub {
    /// Hub on a `ShardedStore` behind a (quiet) fault injector.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Hub with a custom configuration.
    pub fn with_config(config: HubConfig) -> Self {
        init_tracing();
        let clock = Arc::new(ManualClock::new(Timestamp::from_millis(START_MILLIS)));
        let store = Arc::new(FaultyStore::wrap(ShardedStore::new()));
        let hub = Hub::with_store(config, store.clone(), clock.clone()).expect("hub opens");
        Self { hub, clock, store }
    }

    /// Create a channel with default options.
    pub fn channel(&self, name: &str) {
        self.hub
            .create_channel(&ChannelOptions::new(name))
            .expect("channel created");
    }

    /// Append a text item and return its self URI.
    pub fn append(&self, channel: &str, body: &str) -> String {
        self.hub
            .append_item(channel, body.as_bytes().to_vec(), Some("text/plain"))
            .expect("item appended")
            .location()
            .to_string()
    }

    /// Advance the clock.
    pub fn advance(&self, millis: u64) {
        self.clock.advance(Duration::from_millis(millis));
    }
}

/// Default test configuration.
pub fn test_config() -> HubConfig {
    HubConfig {
        base_uri: BASE_URI.to_string(),
        ..HubConfig::default()
    }
}

/// A random, valid, unique-enough channel name.
pub fn random_channel_name() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("test_{}", suffix)
}

/// Path part of an item URI (everything after `/channel/{name}/`).
pub fn item_path<'a>(uri: &'a str, channel: &str) -> &'a str {
    let prefix = format!("{}/channel/{}/", BASE_URI, channel);
    uri.strip_prefix(prefix.as_str()).unwrap_or(uri)
}
