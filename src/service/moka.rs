//! Library-backed cache service on top of `moka`.
//!
//! [`MokaCacheService`] satisfies the same
//! [`CacheService`](crate::traits::CacheService) contract as the custom
//! LFU engine but delegates storage, eviction, and expiry to
//! [`moka::sync::Cache`]. Unlike the engine's forced-eviction timer, this
//! backend has true idle expiry: `time_to_idle` removes entries that go
//! unread for the configured duration, because that is the library's own
//! semantics.
//!
//! ## Statistics
//!
//! The eviction count comes from moka's native removal-notification
//! pipeline (causes `Size` and `Expired`). Moka exposes no load-penalty
//! or put-latency instrumentation, so the latency slot of this backend's
//! [`StatsSnapshot`](crate::stats::StatsSnapshot) is always `0.0`; it is
//! not comparable to the custom engine's measured put times.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use lfukit::service::moka::MokaCacheBuilder;
//!
//! let cache = MokaCacheBuilder::new()
//!     .max_entries(100)
//!     .time_to_idle(Duration::from_secs(30))
//!     .stats_interval(Duration::from_secs(3600))
//!     .try_build()
//!     .unwrap();
//!
//! cache.put(1u64, "hello".to_string());
//! assert!(cache.get(&1).is_some());
//! cache.close();
//! ```

use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::notification::RemovalCause as MokaRemovalCause;
use moka::sync::Cache as MokaCache;

use crate::error::ConfigError;
use crate::listener::{NoopRemovalListener, RemovalCause, RemovalListener};
use crate::scheduler::PeriodicTask;
use crate::stats::{LoggingStatsSink, StatsSink, StatsSnapshot};
use crate::traits::CacheService;

/// Builder for [`MokaCacheService`].
///
/// Defaults mirror the LFU engine's demonstration sizing: 3 entries,
/// 5 second time-to-idle, 5 second stats interval.
pub struct MokaCacheBuilder<K, V> {
    max_entries: u64,
    time_to_idle: Duration,
    stats_interval: Duration,
    listener: Box<dyn RemovalListener<K, V> + Send + Sync>,
    sink: Box<dyn StatsSink + Send + Sync>,
}

impl<K, V> Default for MokaCacheBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MokaCacheBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            max_entries: 3,
            time_to_idle: Duration::from_secs(5),
            stats_interval: Duration::from_secs(5),
            listener: Box::new(NoopRemovalListener),
            sink: Box::new(LoggingStatsSink),
        }
    }

    /// Maximum number of entries. Must be > 0.
    pub fn max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Entries unread for this long become eligible for expiry. Must be
    /// non-zero.
    pub fn time_to_idle(mut self, time_to_idle: Duration) -> Self {
        self.time_to_idle = time_to_idle;
        self
    }

    /// Period of the stats-reporting task. Must be non-zero.
    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }

    /// Callback forwarded moka's removal notifications.
    pub fn removal_listener(
        mut self,
        listener: impl RemovalListener<K, V> + Send + Sync + 'static,
    ) -> Self {
        self.listener = Box::new(listener);
        self
    }

    /// Destination for periodic stats reports.
    pub fn stats_sink(mut self, sink: impl StatsSink + Send + Sync + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Validates the configuration and starts the service.
    pub fn try_build(self) -> Result<MokaCacheService<K, V>, ConfigError>
    where
        K: Eq + Hash + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        if self.max_entries == 0 {
            return Err(ConfigError::new("max_entries must be > 0"));
        }
        if self.time_to_idle.is_zero() {
            return Err(ConfigError::new("time_to_idle must be non-zero"));
        }
        if self.stats_interval.is_zero() {
            return Err(ConfigError::new("stats_interval must be non-zero"));
        }

        let evictions = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&evictions);
        let listener = self.listener;
        let cache: MokaCache<K, Arc<V>> = MokaCache::builder()
            .max_capacity(self.max_entries)
            .time_to_idle(self.time_to_idle)
            .eviction_listener(move |key: Arc<K>, value: Arc<V>, cause| {
                if cause.was_evicted() {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                let mapped = match cause {
                    MokaRemovalCause::Replaced => RemovalCause::Updated,
                    _ => RemovalCause::Evicted,
                };
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    listener.on_removal(&key, &value, mapped);
                }));
                if outcome.is_err() {
                    tracing::error!(?mapped, "removal listener panicked; removal stands");
                }
            })
            .build();

        let sink = self.sink;
        let stats_cache = cache.clone();
        let stats_evictions = Arc::clone(&evictions);
        let stats_task = PeriodicTask::spawn("lfukit-moka-stats", self.stats_interval, move || {
            // Flush pending work so queued removal notifications land in
            // the counter before the snapshot.
            stats_cache.run_pending_tasks();
            sink.report(StatsSnapshot {
                eviction_count: stats_evictions.load(Ordering::Relaxed),
                average_put_nanos: 0.0,
            });
        });

        Ok(MokaCacheService {
            cache,
            evictions,
            stats_task,
        })
    }
}

impl<K, V> std::fmt::Debug for MokaCacheBuilder<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheBuilder")
            .field("max_entries", &self.max_entries)
            .field("time_to_idle", &self.time_to_idle)
            .field("stats_interval", &self.stats_interval)
            .finish_non_exhaustive()
    }
}

/// Cache service delegating to `moka::sync::Cache`.
pub struct MokaCacheService<K, V> {
    cache: MokaCache<K, Arc<V>>,
    evictions: Arc<AtomicU64>,
    stats_task: PeriodicTask,
}

impl<K, V> MokaCacheService<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Fetches the value for `key`, refreshing its idle timer on a hit.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.cache.get(key)
    }

    /// Inserts or replaces the value for `key`.
    pub fn put(&self, key: K, value: V) {
        self.cache.insert(key, Arc::new(value));
    }

    /// Stops the stats task. Idempotent; contents remain readable.
    pub fn close(&self) {
        self.stats_task.stop();
    }

    /// Entries evicted by moka for size or idle expiry, as observed
    /// through its removal-notification pipeline.
    pub fn eviction_count(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Snapshot in the shared stats shape. The latency slot is always
    /// `0.0` for this backend (see the module docs).
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            eviction_count: self.eviction_count(),
            average_put_nanos: 0.0,
        }
    }

    /// Runs moka's pending maintenance so evictions, expiries, and queued
    /// removal notifications take effect now.
    pub fn flush(&self) {
        self.cache.run_pending_tasks();
    }

    /// Current number of entries, after flushing pending work.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl<K, V> CacheService<K, V> for MokaCacheService<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<Arc<V>> {
        MokaCacheService::get(self, key)
    }

    fn put(&self, key: K, value: V) {
        MokaCacheService::put(self, key, value);
    }

    fn close(&self) {
        MokaCacheService::close(self);
    }
}

impl<K, V> std::fmt::Debug for MokaCacheService<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheService")
            .field("eviction_count", &self.evictions.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
