//! The LFU cache engine.
//!
//! [`LfuCacheService`] owns the key→value map and a
//! [`FrequencyIndex`](crate::ds::FrequencyIndex) behind a single
//! `parking_lot::Mutex`, and runs two background tasks: forced eviction
//! and stats reporting.
//!
//! ## Eviction Flow
//!
//! ```text
//!   put(key, value)
//!        │
//!        ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ Key already present?                                         │
//!   │                                                              │
//!   │   YES → replace value, notify (key, old, Updated),           │
//!   │         promote frequency                                    │
//!   │   NO  → at capacity? evict LFU candidate first, then insert  │
//!   │         at frequency 1                                       │
//!   └──────────────────────────────────────────────────────────────┘
//!        │
//!        ▼ (eviction)
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ pop_min → lowest frequency, oldest-promoted among ties       │
//!   │ remove from map, bump eviction counter,                      │
//!   │ notify (key, value, Evicted)                                 │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//!
//! One exclusive lock guards every state-mutating sequence: the whole of
//! `get` (lookup and promotion), the whole of `put`, and `evict`. The two
//! background tasks take the same lock, so callers and timers are totally
//! ordered by lock acquisition and no operation applies partial effects
//! outside it. The lock is intentionally coarse; the index invariants
//! require promote and evict to update map and buckets atomically.
//!
//! Stats counters are atomics updated without the lock. Removal listeners
//! run synchronously inside the mutating operation; a panicking listener
//! is caught and logged, and the committed bookkeeping stands.
//!
//! ## Background tasks
//!
//! The eviction task calls [`evict`](LfuCacheService::evict) on every
//! tick, unconditionally: it does not check whether the cache is full or
//! whether any entry has been idle. An empty cache makes the tick log and
//! skip. The stats task reports a
//! [`StatsSnapshot`](crate::stats::StatsSnapshot) through the configured
//! sink each interval.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use lfukit::builder::LfuCacheBuilder;
//!
//! let cache = LfuCacheBuilder::new()
//!     .max_entries(2)
//!     .eviction_interval(Duration::from_secs(3600))
//!     .stats_interval(Duration::from_secs(3600))
//!     .try_build()
//!     .unwrap();
//!
//! cache.put(1, "alpha");
//! cache.put(2, "beta");
//! cache.get(&1);
//! cache.put(3, "gamma"); // evicts 2: frequency 1, never read
//!
//! assert!(cache.get(&2).is_none());
//! assert_eq!(cache.get(&3).as_deref(), Some(&"gamma"));
//! cache.close();
//! ```

use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::builder::LfuCacheBuilder;
use crate::ds::FrequencyIndex;
use crate::error::EmptyCacheError;
use crate::listener::{RemovalCause, RemovalListener};
use crate::scheduler::PeriodicTask;
use crate::stats::{StatsCollector, StatsSnapshot};
use crate::traits::CacheService;

struct EngineState<K, V> {
    entries: FxHashMap<K, Arc<V>>,
    freq: FrequencyIndex<K>,
}

/// State shared between callers and the background tasks.
struct Shared<K, V> {
    state: Mutex<EngineState<K, V>>,
    stats: StatsCollector,
    listener: Box<dyn RemovalListener<K, V> + Send + Sync>,
    max_entries: usize,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone,
{
    fn evict(&self) -> Result<(K, Arc<V>), EmptyCacheError> {
        let mut state = self.state.lock();
        self.evict_locked(&mut state)
    }

    fn evict_locked(
        &self,
        state: &mut EngineState<K, V>,
    ) -> Result<(K, Arc<V>), EmptyCacheError> {
        let (key, _freq) = state.freq.pop_min().ok_or(EmptyCacheError)?;
        let value = state
            .entries
            .remove(&key)
            .expect("tracked key missing from entry map");
        self.stats.record_eviction();
        self.notify(&key, &value, RemovalCause::Evicted);
        Ok((key, value))
    }

    fn notify(&self, key: &K, value: &V, cause: RemovalCause) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.listener.on_removal(key, value, cause);
        }));
        if outcome.is_err() {
            tracing::error!(?cause, "removal listener panicked; entry removal stands");
        }
    }
}

/// Bounded in-process cache with LFU eviction, periodic forced eviction,
/// and runtime statistics.
///
/// Construct through [`LfuCacheBuilder`](crate::builder::LfuCacheBuilder).
/// The service is `Send + Sync`; share it across threads behind an `Arc`
/// or by reference.
pub struct LfuCacheService<K, V> {
    shared: Arc<Shared<K, V>>,
    eviction_task: PeriodicTask,
    stats_task: PeriodicTask,
}

impl<K, V> LfuCacheService<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    pub(crate) fn spawn(builder: LfuCacheBuilder<K, V>) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(EngineState {
                entries: FxHashMap::with_capacity_and_hasher(
                    builder.max_entries,
                    Default::default(),
                ),
                freq: FrequencyIndex::with_capacity(builder.max_entries),
            }),
            stats: StatsCollector::new(),
            listener: builder.listener,
            max_entries: builder.max_entries,
        });

        let eviction_shared = Arc::clone(&shared);
        let eviction_task = PeriodicTask::spawn(
            "lfukit-eviction",
            builder.eviction_interval,
            move || {
                if let Err(err) = eviction_shared.evict() {
                    tracing::warn!("scheduled eviction skipped: {err}");
                }
            },
        );

        let stats_shared = Arc::clone(&shared);
        let sink = builder.sink;
        let stats_task = PeriodicTask::spawn("lfukit-stats", builder.stats_interval, move || {
            sink.report(stats_shared.stats.snapshot());
        });

        Self {
            shared,
            eviction_task,
            stats_task,
        }
    }

    /// Fetches the value for `key` and promotes its frequency on a hit.
    ///
    /// A miss returns `None` with no side effects.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut state = self.shared.state.lock();
        let value = state.entries.get(key)?.clone();
        state.freq.touch(key);
        Some(value)
    }

    /// Inserts or replaces the value for `key`.
    ///
    /// Replacing notifies the removal listener with the old value and
    /// cause `Updated`, then promotes the key's frequency; the entry's
    /// identity and frequency history are preserved. Inserting a new key
    /// into a full cache evicts the LFU candidate first. The elapsed wall
    /// time of the whole operation is recorded into the stats collector.
    pub fn put(&self, key: K, value: V) {
        let start = Instant::now();
        let value = Arc::new(value);
        {
            let mut state = self.shared.state.lock();
            if let Some(slot) = state.entries.get_mut(&key) {
                let old = std::mem::replace(slot, value);
                self.shared.notify(&key, &old, RemovalCause::Updated);
                state.freq.touch(&key);
            } else {
                if state.entries.len() >= self.shared.max_entries {
                    // Cannot fail: len >= max_entries >= 1.
                    let _ = self.shared.evict_locked(&mut state);
                }
                state.entries.insert(key.clone(), value);
                state.freq.insert(key);
            }
        }
        self.shared.stats.record_put(start.elapsed());
    }

    /// Evicts the LFU candidate: lowest frequency, and among equals the
    /// key that has been at that frequency the longest.
    ///
    /// Bumps the eviction counter and notifies the removal listener with
    /// cause `Evicted`. An empty cache is a loud [`EmptyCacheError`],
    /// never a silent no-op.
    pub fn evict(&self) -> Result<(K, Arc<V>), EmptyCacheError> {
        self.shared.evict()
    }

    /// Stops the eviction and stats tasks. Idempotent; contents are
    /// abandoned in place and remain readable.
    pub fn close(&self) {
        self.eviction_task.stop();
        self.stats_task.stop();
    }

    /// Current number of live entries.
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    pub fn max_entries(&self) -> usize {
        self.shared.max_entries
    }

    /// Current access frequency for `key`, if present. Does not count as
    /// an access.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.shared.state.lock().freq.frequency(key)
    }

    /// Snapshot of the eviction counter and mean put latency.
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate_invariants(&self) {
        let state = self.shared.state.lock();
        assert!(state.entries.len() <= self.shared.max_entries);
        assert_eq!(state.entries.len(), state.freq.len());
        for key in state.entries.keys() {
            assert!(state.freq.contains(key));
        }
        state.freq.debug_validate_invariants();
    }
}

impl<K, V> CacheService<K, V> for LfuCacheService<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<Arc<V>> {
        LfuCacheService::get(self, key)
    }

    fn put(&self, key: K, value: V) {
        LfuCacheService::put(self, key, value);
    }

    fn close(&self) {
        LfuCacheService::close(self);
    }
}

impl<K, V> std::fmt::Debug for LfuCacheService<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LfuCacheService")
            .field("max_entries", &self.shared.max_entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LfuCacheBuilder;
    use std::time::Duration;

    // Unit tests pin the timers far out so only explicit calls mutate the
    // cache; timer behavior is covered by the integration suite.
    fn quiet_builder<K, V>() -> LfuCacheBuilder<K, V> {
        LfuCacheBuilder::new()
            .eviction_interval(Duration::from_secs(3600))
            .stats_interval(Duration::from_secs(3600))
    }

    #[derive(Clone, Default)]
    struct RecordingListener {
        events: Arc<Mutex<Vec<(u32, String, RemovalCause)>>>,
    }

    impl RemovalListener<u32, String> for RecordingListener {
        fn on_removal(&self, key: &u32, value: &String, cause: RemovalCause) {
            self.events.lock().push((*key, value.clone(), cause));
        }
    }

    #[test]
    fn miss_returns_none_without_side_effects() {
        let cache = quiet_builder::<u32, String>().try_build().unwrap();
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.frequency(&1), None);
        cache.debug_validate_invariants();
    }

    #[test]
    fn put_then_get_roundtrip() {
        let cache = quiet_builder().try_build().unwrap();
        cache.put(1u32, "one".to_string());

        assert_eq!(cache.get(&1).as_deref().map(String::as_str), Some("one"));
        assert_eq!(cache.len(), 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn get_promotes_frequency() {
        let cache = quiet_builder().try_build().unwrap();
        cache.put(1u32, "one".to_string());
        assert_eq!(cache.frequency(&1), Some(1));

        cache.get(&1);
        cache.get(&1);
        assert_eq!(cache.frequency(&1), Some(3));
    }

    #[test]
    fn update_replaces_value_and_notifies_once() {
        let listener = RecordingListener::default();
        let events = Arc::clone(&listener.events);
        let cache = quiet_builder()
            .removal_listener(listener)
            .try_build()
            .unwrap();

        cache.put(1, "v1".to_string());
        cache.put(1, "v2".to_string());

        assert_eq!(cache.get(&1).as_deref().map(String::as_str), Some("v2"));
        assert_eq!(cache.len(), 1);

        let events = events.lock();
        assert_eq!(
            events.as_slice(),
            &[(1, "v1".to_string(), RemovalCause::Updated)]
        );
    }

    #[test]
    fn update_promotes_instead_of_resetting_frequency() {
        let cache = quiet_builder().try_build().unwrap();
        cache.put(1u32, "v1".to_string());
        cache.get(&1);
        cache.get(&1);
        assert_eq!(cache.frequency(&1), Some(3));

        cache.put(1, "v2".to_string());
        assert_eq!(cache.frequency(&1), Some(4));
    }

    #[test]
    fn capacity_invariant_holds_after_every_put() {
        let cache = quiet_builder().max_entries(3).try_build().unwrap();
        for i in 0..50u32 {
            cache.put(i, i.to_string());
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.len(), 3);
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_candidate_is_evicted_at_capacity() {
        let cache = quiet_builder().max_entries(3).try_build().unwrap();
        cache.put(1u32, "A".to_string());
        cache.put(2, "B".to_string());
        cache.put(3, "C".to_string());
        cache.get(&1);
        cache.get(&1);
        cache.get(&2);

        // Key 3 is the only entry never accessed (frequency 1).
        cache.put(4, "D".to_string());

        assert_eq!(cache.get(&3), None);
        assert_eq!(cache.get(&4).as_deref().map(String::as_str), Some("D"));
        assert!(cache.get(&1).is_some());
        assert!(cache.get(&2).is_some());
        cache.debug_validate_invariants();
    }

    #[test]
    fn ties_evict_the_longest_resident_at_that_tier() {
        let cache = quiet_builder().max_entries(2).try_build().unwrap();
        cache.put(1u32, "A".to_string());
        cache.put(2, "B".to_string());

        // Both at frequency 1; key 1 entered the tier first.
        cache.put(3, "C".to_string());

        assert_eq!(cache.get(&1), None);
        assert!(cache.get(&2).is_some());
        assert!(cache.get(&3).is_some());
    }

    #[test]
    fn evict_on_empty_cache_fails_loudly() {
        let cache = quiet_builder::<u32, String>().try_build().unwrap();
        assert_eq!(cache.evict(), Err(EmptyCacheError));
        assert_eq!(cache.stats().eviction_count, 0);
    }

    #[test]
    fn evict_returns_candidate_and_counts() {
        let listener = RecordingListener::default();
        let events = Arc::clone(&listener.events);
        let cache = quiet_builder()
            .removal_listener(listener)
            .try_build()
            .unwrap();

        cache.put(1, "cold".to_string());
        cache.put(2, "hot".to_string());
        cache.get(&2);

        let (key, value) = cache.evict().unwrap();
        assert_eq!(key, 1);
        assert_eq!(value.as_str(), "cold");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().eviction_count, 1);
        assert_eq!(
            events.lock().as_slice(),
            &[(1, "cold".to_string(), RemovalCause::Evicted)]
        );
        cache.debug_validate_invariants();
    }

    #[test]
    fn capacity_evictions_are_counted() {
        let cache = quiet_builder().max_entries(2).try_build().unwrap();
        for i in 0..5u32 {
            cache.put(i, i.to_string());
        }
        // 5 puts into 2 slots: 3 capacity evictions.
        assert_eq!(cache.stats().eviction_count, 3);
    }

    #[test]
    fn put_latency_is_recorded_on_both_paths() {
        let cache = quiet_builder().try_build().unwrap();
        cache.put(1u32, "insert".to_string());
        cache.put(1, "update".to_string());

        let snap = cache.stats();
        // Two samples recorded; the mean is a real measurement.
        assert!(snap.average_put_nanos >= 0.0);
        assert_eq!(cache.stats().eviction_count, 0);
    }

    struct PanickingListener;

    impl RemovalListener<u32, String> for PanickingListener {
        fn on_removal(&self, _key: &u32, _value: &String, _cause: RemovalCause) {
            panic!("listener failure");
        }
    }

    #[test]
    fn panicking_listener_leaves_cache_consistent() {
        let cache = quiet_builder()
            .removal_listener(PanickingListener)
            .max_entries(2)
            .try_build()
            .unwrap();

        cache.put(1u32, "v1".to_string());
        cache.put(1, "v2".to_string()); // Updated notification panics
        cache.put(2, "w".to_string());
        cache.put(3, "x".to_string()); // Evicted notification panics

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().eviction_count, 1);
        assert_eq!(cache.get(&1).as_deref().map(String::as_str), Some("v2"));
        assert!(cache.get(&3).is_some());
        cache.debug_validate_invariants();
    }

    #[test]
    fn close_is_idempotent_and_abandons_contents() {
        let cache = quiet_builder().try_build().unwrap();
        cache.put(1u32, "one".to_string());

        cache.close();
        cache.close();

        // Contents are abandoned, not cleared.
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&1).is_some());
        cache.put(2, "two".to_string());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn service_is_usable_through_the_trait() {
        fn exercise<C: CacheService<u32, String>>(cache: &C) {
            cache.put(7, "seven".to_string());
            assert_eq!(cache.get(&7).as_deref().map(String::as_str), Some("seven"));
            assert_eq!(cache.get(&8), None);
            cache.close();
        }

        let cache = quiet_builder().try_build().unwrap();
        exercise(&cache);
    }
}
