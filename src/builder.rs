//! Validated construction for the LFU cache service.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use lfukit::builder::LfuCacheBuilder;
//!
//! let cache = LfuCacheBuilder::new()
//!     .max_entries(100)
//!     .eviction_interval(Duration::from_secs(30))
//!     .stats_interval(Duration::from_secs(10))
//!     .try_build()
//!     .unwrap();
//!
//! cache.put(1u64, "hello".to_string());
//! assert!(cache.get(&1).is_some());
//! cache.close();
//! ```

use std::hash::Hash;
use std::time::Duration;

use crate::error::ConfigError;
use crate::listener::{NoopRemovalListener, RemovalListener};
use crate::service::lfu::LfuCacheService;
use crate::stats::{LoggingStatsSink, StatsSink};

/// Demonstration sizing, not production sizing.
pub const DEFAULT_MAX_ENTRIES: usize = 3;
/// Default period of the forced-eviction task.
pub const DEFAULT_EVICTION_INTERVAL: Duration = Duration::from_secs(5);
/// Default period of the stats-reporting task.
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Builder for [`LfuCacheService`].
///
/// Defaults: 3 entries, 5 second eviction and stats intervals, a no-op
/// removal listener, and a logging stats sink.
///
/// Note the eviction interval drives *forced* eviction: one entry is
/// evicted per tick regardless of fullness or per-entry idle time. It is
/// not a time-to-idle.
pub struct LfuCacheBuilder<K, V> {
    pub(crate) max_entries: usize,
    pub(crate) eviction_interval: Duration,
    pub(crate) stats_interval: Duration,
    pub(crate) listener: Box<dyn RemovalListener<K, V> + Send + Sync>,
    pub(crate) sink: Box<dyn StatsSink + Send + Sync>,
}

impl<K, V> Default for LfuCacheBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> LfuCacheBuilder<K, V> {
    pub fn new() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            eviction_interval: DEFAULT_EVICTION_INTERVAL,
            stats_interval: DEFAULT_STATS_INTERVAL,
            listener: Box::new(NoopRemovalListener),
            sink: Box::new(LoggingStatsSink),
        }
    }

    /// Maximum number of entries. Must be > 0.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Period of the forced-eviction task. Must be non-zero.
    pub fn eviction_interval(mut self, interval: Duration) -> Self {
        self.eviction_interval = interval;
        self
    }

    /// Period of the stats-reporting task. Must be non-zero.
    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }

    /// Callback invoked synchronously whenever an entry leaves the cache.
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

    /// Validates the configuration and starts the service (including its
    /// two background tasks).
    pub fn try_build(self) -> Result<LfuCacheService<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone + Send + 'static,
        V: Send + Sync + 'static,
    {
        if self.max_entries == 0 {
            return Err(ConfigError::new("max_entries must be > 0"));
        }
        if self.eviction_interval.is_zero() {
            return Err(ConfigError::new("eviction_interval must be non-zero"));
        }
        if self.stats_interval.is_zero() {
            return Err(ConfigError::new("stats_interval must be non-zero"));
        }
        Ok(LfuCacheService::spawn(self))
    }
}

impl<K, V> std::fmt::Debug for LfuCacheBuilder<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LfuCacheBuilder")
            .field("max_entries", &self.max_entries)
            .field("eviction_interval", &self.eviction_interval)
            .field("stats_interval", &self.stats_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let builder = LfuCacheBuilder::<u32, u32>::new();
        assert_eq!(builder.max_entries, 3);
        assert_eq!(builder.eviction_interval, Duration::from_secs(5));
        assert_eq!(builder.stats_interval, Duration::from_secs(5));
    }

    #[test]
    fn zero_max_entries_is_rejected() {
        let err = LfuCacheBuilder::<u32, u32>::new()
            .max_entries(0)
            .try_build()
            .unwrap_err();
        assert!(err.message().contains("max_entries"));
    }

    #[test]
    fn zero_eviction_interval_is_rejected() {
        let err = LfuCacheBuilder::<u32, u32>::new()
            .eviction_interval(Duration::ZERO)
            .try_build()
            .unwrap_err();
        assert!(err.message().contains("eviction_interval"));
    }

    #[test]
    fn zero_stats_interval_is_rejected() {
        let err = LfuCacheBuilder::<u32, u32>::new()
            .stats_interval(Duration::ZERO)
            .try_build()
            .unwrap_err();
        assert!(err.message().contains("stats_interval"));
    }

    #[test]
    fn valid_configuration_builds_a_running_service() {
        let cache = LfuCacheBuilder::<u32, String>::new()
            .max_entries(10)
            .eviction_interval(Duration::from_secs(3600))
            .stats_interval(Duration::from_secs(3600))
            .try_build()
            .unwrap();
        assert_eq!(cache.max_entries(), 10);
        cache.close();
    }
}
