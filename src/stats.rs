//! Runtime statistics: counters, snapshots, and reporting sinks.
//!
//! [`StatsCollector`] holds the counters the cache engine updates inline
//! with its operations (eviction count and cumulative put timing) as
//! plain atomics, so recording never takes the cache lock. The running
//! mean put latency is derived at snapshot time from the cumulative sum
//! and count (`mean = total / n`, the incremental-mean identity folded
//! into two counters).
//!
//! A [`StatsSink`] is the single-method collaborator a periodic task
//! reports snapshots through. [`LoggingStatsSink`] writes them to
//! `tracing` and is the default wiring.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time view of a cache's statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    /// Total entries removed by eviction (capacity-triggered and
    /// timer-forced) since construction.
    pub eviction_count: u64,
    /// Mean wall time of `put`, in nanoseconds; 0.0 before the first put.
    pub average_put_nanos: f64,
}

/// Counters owned by a cache instance for its lifetime.
///
/// Updates use `Relaxed` ordering: the counters are observational and
/// never gate cache correctness.
#[derive(Debug, Default)]
pub struct StatsCollector {
    evictions: AtomicU64,
    put_nanos_total: AtomicU64,
    put_count: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed eviction.
    #[inline]
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the elapsed wall time of one `put` operation.
    #[inline]
    pub fn record_put(&self, elapsed: Duration) {
        // Saturation keeps ~584 years of cumulative put time before the
        // total would wrap; the mean degrades rather than corrupts.
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.put_nanos_total.fetch_add(nanos, Ordering::Relaxed);
        self.put_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the eviction count alone.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Takes a snapshot of both counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let count = self.put_count.load(Ordering::Relaxed);
        let total = self.put_nanos_total.load(Ordering::Relaxed);
        let average_put_nanos = if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        };
        StatsSnapshot {
            eviction_count: self.evictions.load(Ordering::Relaxed),
            average_put_nanos,
        }
    }
}

/// Destination for periodic statistics reports.
pub trait StatsSink {
    fn report(&self, snapshot: StatsSnapshot);
}

/// Sink that logs snapshots at `info` level. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingStatsSink;

impl StatsSink for LoggingStatsSink {
    fn report(&self, snapshot: StatsSnapshot) {
        tracing::info!(
            average_put_nanos = snapshot.average_put_nanos,
            "average put time"
        );
        tracing::info!(
            eviction_count = snapshot.eviction_count,
            "total number of cache evictions"
        );
    }
}

/// Sink that discards snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatsSink;

impl StatsSink for NoopStatsSink {
    fn report(&self, _snapshot: StatsSnapshot) {}
}
