//! Frequency index for O(1) LFU tracking.
//!
//! Tracks per-key access frequencies for LFU eviction with O(1) insert,
//! touch, remove, and pop operations. Keys are organized into frequency
//! buckets with FIFO tie-breaking inside each bucket.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      FrequencyIndex<K> Layout                    │
//! │                                                                  │
//! │  index: FxHashMap<K, usize>      slots: Vec<Slot<K>> + free list │
//! │  ┌──────────┬───────┐            ┌─────┬─────────────────────┐   │
//! │  │ "page_a" │   0   │───────────►│  0  │ freq:2, prev/next   │   │
//! │  │ "page_b" │   1   │───────────►│  1  │ freq:1, prev/next   │   │
//! │  │ "page_c" │   2   │───────────►│  2  │ freq:1, prev/next   │   │
//! │  └──────────┴───────┘            └─────┴─────────────────────┘   │
//! │                                                                  │
//! │  buckets: FxHashMap<u64, Bucket>   (frequency → linked list)     │
//! │                                                                  │
//! │  min_freq = 1                                                    │
//! │      │                                                           │
//! │      ▼                                                           │
//! │  freq=1: head ──► [2] ◄──► [1] ◄── tail   (tail evicted first)   │
//! │  freq=2: head ──► [0] ◄── tail                                   │
//! │                                                                  │
//! │  Bucket chain: freq=1 ──next──► freq=2                           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation  | Time | Notes                                    |
//! |------------|------|------------------------------------------|
//! | `insert`   | O(1) | New key starts at freq=1, marker := 1    |
//! | `touch`    | O(1) | Increment frequency, move to bucket head |
//! | `remove`   | O(1) | Untrack a key                            |
//! | `pop_min`  | O(1) | Evict LFU (FIFO tie-break)               |
//! | `peek_min` | O(1) | Inspect the eviction candidate           |
//!
//! The minimum-frequency marker makes eviction O(1): when the minimum
//! bucket empties during a touch or removal, the marker advances along the
//! bucket chain to the emptied bucket's successor, and every insertion
//! resets it to 1. No operation ever scans for the minimum frequency.
//!
//! ## Example
//!
//! ```
//! use lfukit::ds::FrequencyIndex;
//!
//! let mut freq = FrequencyIndex::new();
//! freq.insert("a");
//! freq.insert("b");
//! freq.touch(&"a"); // "a" now at freq=2
//!
//! assert_eq!(freq.frequency(&"a"), Some(2));
//! assert_eq!(freq.min_freq(), Some(1));
//!
//! // "b" is the eviction candidate (lowest frequency)
//! assert_eq!(freq.pop_min(), Some(("b", 1)));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug)]
struct Entry<K> {
    key: K,
    freq: u64,
}

#[derive(Debug)]
struct Slot<K> {
    entry: Option<Entry<K>>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// One frequency tier: a doubly linked list of slots plus chain links to
/// the neighboring tiers.
#[derive(Debug, Default)]
struct Bucket {
    head: Option<usize>,
    tail: Option<usize>,
    prev: Option<u64>,
    next: Option<u64>,
}

impl Bucket {
    fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// O(1) LFU metadata tracker with FIFO tie-breaking within a frequency.
///
/// Within a bucket the head is the most recently promoted key and the tail
/// is the oldest; `pop_min` takes the tail of the minimum-frequency bucket,
/// so among equal frequencies the key that has spent the longest time at
/// that tier is evicted first.
///
/// # Example
///
/// ```
/// use lfukit::ds::FrequencyIndex;
///
/// let mut freq = FrequencyIndex::new();
/// freq.insert("a");
/// freq.insert("b");
/// freq.insert("c");
/// freq.touch(&"c");
///
/// // FIFO order among the freq=1 keys, then the promoted key
/// assert_eq!(freq.pop_min(), Some(("a", 1)));
/// assert_eq!(freq.pop_min(), Some(("b", 1)));
/// assert_eq!(freq.pop_min(), Some(("c", 2)));
/// assert_eq!(freq.pop_min(), None);
/// ```
#[derive(Debug)]
pub struct FrequencyIndex<K> {
    slots: Vec<Slot<K>>,
    free: Vec<usize>,
    index: FxHashMap<K, usize>,
    buckets: FxHashMap<u64, Bucket>,
    min_freq: u64,
}

impl<K> Default for FrequencyIndex<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FrequencyIndex<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: FxHashMap::default(),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    /// Creates an empty index with reserved capacity for slots and keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` if `key` is tracked.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the current frequency for `key`, if tracked.
    ///
    /// ```
    /// use lfukit::ds::FrequencyIndex;
    ///
    /// let mut freq = FrequencyIndex::new();
    /// freq.insert("key");
    /// freq.touch(&"key");
    ///
    /// assert_eq!(freq.frequency(&"key"), Some(2));
    /// assert_eq!(freq.frequency(&"missing"), None);
    /// ```
    #[inline]
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let idx = *self.index.get(key)?;
        self.slots[idx].entry.as_ref().map(|entry| entry.freq)
    }

    /// Returns the lowest frequency currently present.
    pub fn min_freq(&self) -> Option<u64> {
        if self.min_freq == 0 {
            None
        } else {
            Some(self.min_freq)
        }
    }

    /// Peeks the eviction candidate `(key, freq)` without removing it.
    ///
    /// The candidate is the tail of the minimum-frequency bucket: the key
    /// that has been at the lowest tier the longest.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let idx = self.buckets.get(&self.min_freq)?.tail?;
        let entry = self.slots[idx].entry.as_ref()?;
        Some((&entry.key, entry.freq))
    }

    /// Tracks a new key at frequency 1 and resets the minimum marker to 1.
    ///
    /// Returns `false` if the key is already tracked (no update performed).
    ///
    /// ```
    /// use lfukit::ds::FrequencyIndex;
    ///
    /// let mut freq = FrequencyIndex::new();
    /// assert!(freq.insert("a"));
    /// assert!(!freq.insert("a"));
    /// assert_eq!(freq.frequency(&"a"), Some(1));
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let idx = self.alloc_slot(Entry {
            key: key.clone(),
            freq: 1,
        });
        self.index.insert(key, idx);

        if !self.buckets.contains_key(&1) {
            let next = if self.min_freq == 0 {
                None
            } else {
                Some(self.min_freq)
            };
            self.insert_bucket(1, None, next);
        }
        let bucket = self.buckets.get_mut(&1).expect("bucket 1 missing");
        Self::list_push_front(&mut self.slots, bucket, idx);
        self.min_freq = 1;
        true
    }

    /// Increments the frequency for `key` and returns the new frequency.
    ///
    /// The key moves to the head of its new bucket (most recently
    /// promoted). Returns `None` if the key is not tracked. At `u64::MAX`
    /// the frequency saturates and only the in-bucket position refreshes.
    ///
    /// ```
    /// use lfukit::ds::FrequencyIndex;
    ///
    /// let mut freq = FrequencyIndex::new();
    /// freq.insert("key");
    /// assert_eq!(freq.touch(&"key"), Some(2));
    /// assert_eq!(freq.touch(&"key"), Some(3));
    /// assert_eq!(freq.touch(&"missing"), None);
    /// ```
    #[inline]
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let idx = *self.index.get(key)?;
        let freq = self.slots[idx].entry.as_ref()?.freq;

        if freq == u64::MAX {
            let bucket = self.buckets.get_mut(&freq)?;
            Self::list_remove(&mut self.slots, bucket, idx);
            Self::list_push_front(&mut self.slots, bucket, idx);
            return Some(freq);
        }
        let next_freq = freq + 1;

        let (prev, next, emptied) = {
            let bucket = self.buckets.get_mut(&freq)?;
            Self::list_remove(&mut self.slots, bucket, idx);
            (bucket.prev, bucket.next, bucket.is_empty())
        };

        if emptied {
            self.remove_bucket(freq, prev, next);
            if self.min_freq == freq {
                self.min_freq = next.unwrap_or(0);
            }
        }

        if !self.buckets.contains_key(&next_freq) {
            let chain_prev = if emptied { prev } else { Some(freq) };
            self.insert_bucket(next_freq, chain_prev, next);
        }

        if let Some(entry) = self.slots[idx].entry.as_mut() {
            entry.freq = next_freq;
        }
        let bucket = self
            .buckets
            .get_mut(&next_freq)
            .expect("promoted bucket missing");
        Self::list_push_front(&mut self.slots, bucket, idx);
        if self.min_freq == 0 || next_freq < self.min_freq {
            self.min_freq = next_freq;
        }

        Some(next_freq)
    }

    /// Untracks `key` and returns its previous frequency.
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        let idx = self.index.remove(key)?;
        let freq = self.slots[idx].entry.as_ref()?.freq;

        let (prev, next, emptied) = {
            let bucket = self.buckets.get_mut(&freq)?;
            Self::list_remove(&mut self.slots, bucket, idx);
            (bucket.prev, bucket.next, bucket.is_empty())
        };

        if emptied {
            self.remove_bucket(freq, prev, next);
            if self.min_freq == freq {
                self.min_freq = next.unwrap_or(0);
            }
        }

        self.release_slot(idx).map(|entry| entry.freq)
    }

    /// Removes and returns the eviction candidate `(key, freq)`.
    ///
    /// Candidates come from the tail of the minimum-frequency bucket, so
    /// ties are broken FIFO: the key longest at that tier goes first.
    #[inline]
    pub fn pop_min(&mut self) -> Option<(K, u64)> {
        let freq = self.min_freq;
        if freq == 0 {
            return None;
        }

        let (idx, prev, next, emptied) = {
            let bucket = self.buckets.get_mut(&freq)?;
            let idx = bucket.tail?;
            Self::list_remove(&mut self.slots, bucket, idx);
            (idx, bucket.prev, bucket.next, bucket.is_empty())
        };

        if emptied {
            self.remove_bucket(freq, prev, next);
            if self.min_freq == freq {
                self.min_freq = next.unwrap_or(0);
            }
        }

        let entry = self.release_slot(idx)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.freq))
    }

    /// Clears all state.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    fn alloc_slot(&mut self, entry: Entry<K>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Slot {
                entry: Some(entry),
                prev: None,
                next: None,
            };
            idx
        } else {
            self.slots.push(Slot {
                entry: Some(entry),
                prev: None,
                next: None,
            });
            self.slots.len() - 1
        }
    }

    fn release_slot(&mut self, idx: usize) -> Option<Entry<K>> {
        let entry = self.slots[idx].entry.take();
        self.slots[idx].prev = None;
        self.slots[idx].next = None;
        self.free.push(idx);
        entry
    }

    fn insert_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            Bucket {
                head: None,
                tail: None,
                prev,
                next,
            },
        );

        if let Some(prev_freq) = prev
            && let Some(bucket) = self.buckets.get_mut(&prev_freq)
        {
            bucket.next = Some(freq);
        }
        if let Some(next_freq) = next
            && let Some(bucket) = self.buckets.get_mut(&next_freq)
        {
            bucket.prev = Some(freq);
        }
    }

    fn remove_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        if let Some(prev_freq) = prev
            && let Some(bucket) = self.buckets.get_mut(&prev_freq)
        {
            bucket.next = next;
        }
        if let Some(next_freq) = next
            && let Some(bucket) = self.buckets.get_mut(&next_freq)
        {
            bucket.prev = prev;
        }
        self.buckets.remove(&freq);
    }

    fn list_push_front(slots: &mut [Slot<K>], bucket: &mut Bucket, idx: usize) {
        let old_head = bucket.head;
        slots[idx].prev = None;
        slots[idx].next = old_head;
        if let Some(head_idx) = old_head {
            slots[head_idx].prev = Some(idx);
        } else {
            bucket.tail = Some(idx);
        }
        bucket.head = Some(idx);
    }

    fn list_remove(slots: &mut [Slot<K>], bucket: &mut Bucket, idx: usize) {
        let prev = slots[idx].prev;
        let next = slots[idx].next;
        if let Some(prev_idx) = prev {
            slots[prev_idx].next = next;
        } else {
            bucket.head = next;
        }
        if let Some(next_idx) = next {
            slots[next_idx].prev = prev;
        } else {
            bucket.tail = prev;
        }
        slots[idx].prev = None;
        slots[idx].next = None;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.is_empty() {
            assert!(self.buckets.is_empty());
            assert_eq!(self.min_freq, 0);
            return;
        }

        assert!(self.min_freq > 0);
        assert!(self.buckets.contains_key(&self.min_freq));

        let mut listed = 0usize;
        for (&freq, bucket) in &self.buckets {
            assert!(!bucket.is_empty());
            if let Some(prev) = bucket.prev {
                assert!(prev < freq);
                assert!(self.buckets.contains_key(&prev));
                assert_eq!(self.buckets[&prev].next, Some(freq));
            } else {
                assert_eq!(self.min_freq, freq);
            }
            if let Some(next) = bucket.next {
                assert!(next > freq);
                assert!(self.buckets.contains_key(&next));
                assert_eq!(self.buckets[&next].prev, Some(freq));
            }

            let mut current = bucket.head;
            let mut last = None;
            while let Some(idx) = current {
                let slot = &self.slots[idx];
                let entry = slot.entry.as_ref().expect("bucket references empty slot");
                assert_eq!(entry.freq, freq);
                assert_eq!(slot.prev, last);
                assert_eq!(self.index.get(&entry.key), Some(&idx));
                last = Some(idx);
                current = slot.next;
                listed += 1;
            }
            assert_eq!(bucket.tail, last);
        }
        assert_eq!(listed, self.index.len());
    }
}
