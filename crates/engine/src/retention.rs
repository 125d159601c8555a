//! Retention sweeper
//!
//! Evicts items whose age exceeds their channel's TTL. Keys are ordered by
//! insertion time, so expired items always form a contiguous prefix of a
//! channel's log: the sweep reads from the oldest end and stops at the first
//! item that is still young.
//!
//! # Design Notes
//!
//! - Runs in a background thread, never blocks appends to other channels
//! - Graceful shutdown via atomic flag, polled at 100ms granularity
//! - A failed eviction stops that channel for this cycle only; the next
//!   cycle picks up where it left off
//! - Channel records are never removed here

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use channelhub_core::{ChannelConfig, Clock, Error, Result, Timestamp};

use crate::config::RetentionConfig;
use crate::registry::ChannelRegistry;
use crate::sequencer::ItemSequencer;

/// Longest single sleep between shutdown checks
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// What the sweeper is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SweepState {
    /// Between cycles
    Idle = 0,
    /// Reading a channel's oldest items
    Scanning = 1,
    /// Deleting expired items
    Evicting = 2,
}

impl SweepState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SweepState::Scanning,
            2 => SweepState::Evicting,
            _ => SweepState::Idle,
        }
    }
}

/// Outcome of one sweep cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Channels visited
    pub channels_scanned: usize,
    /// Items removed
    pub items_evicted: usize,
    /// Channels whose sweep stopped on an error
    pub failures: usize,
    /// Channels that still had expired items when the budget ran out
    pub channels_over_budget: usize,
}

/// Background TTL enforcement
///
/// # Example
///
/// ```ignore
/// let sweeper = hub.retention();
/// let handle = sweeper.start()?;
///
/// // ... serve traffic ...
///
/// sweeper.shutdown();
/// handle.join().ok();
/// ```
pub struct RetentionSweeper {
    registry: Arc<ChannelRegistry>,
    sequencer: Arc<ItemSequencer>,
    clock: Arc<dyn Clock>,
    config: RetentionConfig,
    state: AtomicU8,
    shutdown: AtomicBool,
}

impl RetentionSweeper {
    /// Create a sweeper; nothing runs until `sweep_once` or `start`
    pub fn new(
        registry: Arc<ChannelRegistry>,
        sequencer: Arc<ItemSequencer>,
        clock: Arc<dyn Clock>,
        config: RetentionConfig,
    ) -> Self {
        Self {
            registry,
            sequencer,
            clock,
            config,
            state: AtomicU8::new(SweepState::Idle as u8),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Current state
    pub fn state(&self) -> SweepState {
        SweepState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: SweepState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Run one full cycle over every channel
    ///
    /// # Errors
    ///
    /// Only listing the channels can fail the cycle; per-channel failures are
    /// counted in the report and logged.
    pub fn sweep_once(&self) -> Result<SweepReport> {
        let channels = self.registry.list()?;
        let now = self.clock.now();
        let mut report = SweepReport::default();

        for channel in &channels {
            report.channels_scanned += 1;
            match self.sweep_channel(channel, now) {
                Ok((evicted, over_budget)) => {
                    report.items_evicted += evicted;
                    if over_budget {
                        report.channels_over_budget += 1;
                    }
                }
                Err(e) => {
                    report.failures += 1;
                    warn!(channel = %channel.name, error = %e, "Retention sweep failed, will retry next cycle");
                }
            }
        }
        self.set_state(SweepState::Idle);

        debug!(
            channels = report.channels_scanned,
            evicted = report.items_evicted,
            failures = report.failures,
            "Retention sweep finished"
        );
        Ok(report)
    }

    /// Evict the expired prefix of one channel
    ///
    /// Returns the eviction count and whether the budget stopped the sweep
    /// before the first young item was reached.
    fn sweep_channel(&self, channel: &ChannelConfig, now: Timestamp) -> Result<(usize, bool)> {
        let name = channel.name.as_str();
        let budget = self.config.max_evictions_per_channel;
        let mut evicted = 0;

        loop {
            if evicted >= budget {
                let more = self
                    .sequencer
                    .oldest(name, 1)?
                    .first()
                    .is_some_and(|key| channel.is_expired(key.timestamp(), now));
                return Ok((evicted, more));
            }

            self.set_state(SweepState::Scanning);
            let limit = self.config.batch_size.max(1).min(budget - evicted);
            let batch = self.sequencer.oldest(name, limit)?;
            let expired: Vec<_> = batch
                .iter()
                .take_while(|key| channel.is_expired(key.timestamp(), now))
                .collect();
            let reached_young = expired.len() < batch.len();

            self.set_state(SweepState::Evicting);
            for key in expired {
                self.sequencer.evict(name, key)?;
                evicted += 1;
            }

            if reached_young || batch.len() < limit {
                return Ok((evicted, false));
            }
        }
    }

    /// Start the background sweep thread
    ///
    /// The thread sleeps `interval_ms` between cycles and exits shortly after
    /// `shutdown()`.
    ///
    /// # Errors
    ///
    /// - `Conflict` once `shutdown()` has been called; a stopped sweeper
    ///   stays stopped
    /// - `IoError` if the thread cannot be spawned
    pub fn start(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        if self.is_shutdown() {
            return Err(Error::Conflict(
                "retention sweeper has been shut down".to_string(),
            ));
        }
        let sweeper = Arc::clone(self);
        let interval = Duration::from_millis(self.config.interval_ms);

        let handle = thread::Builder::new()
            .name("channelhub-retention".to_string())
            .spawn(move || {
                info!(interval_ms = interval.as_millis() as u64, "Retention sweeper started");
                while sweeper.sleep(interval) {
                    if let Err(e) = sweeper.sweep_once() {
                        error!(error = %e, "Retention sweep cycle failed");
                    }
                }
                info!("Retention sweeper stopped");
            })?;
        Ok(handle)
    }

    /// Sleep for `interval`, returning `false` as soon as shutdown is seen
    fn sleep(&self, interval: Duration) -> bool {
        let step = SHUTDOWN_POLL.min(interval);
        let mut elapsed = Duration::ZERO;
        while elapsed < interval {
            if self.is_shutdown() {
                return false;
            }
            thread::sleep(step);
            elapsed += step;
        }
        !self.is_shutdown()
    }

    /// Signal shutdown
    ///
    /// After calling this, the background thread exits within ~100ms.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Check if shutdown has been signaled
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}
