//! Core cache service contract.
//!
//! [`CacheService`] is the surface both backends expose: the custom LFU
//! engine ([`LfuCacheService`](crate::service::lfu::LfuCacheService)) and
//! the moka-backed service (`MokaCacheService`, behind the `backend-moka`
//! feature). Code written against the trait can swap one for the other
//! without caring which eviction machinery runs underneath.
//!
//! Misses are values, not errors: `get` on an absent or already-evicted
//! key returns `None`. `close` stops a service's background activity and
//! is idempotent; cached contents are abandoned, not cleared.

use std::sync::Arc;

/// A bounded, self-managing in-process cache.
///
/// Values are handed out as `Arc<V>` so a lookup result stays valid even
/// if the entry is evicted immediately afterwards.
pub trait CacheService<K, V> {
    /// Fetches the value for `key`, or `None` on a miss.
    ///
    /// A hit counts as an access for the backend's eviction policy; `get`
    /// is not read-only.
    fn get(&self, key: &K) -> Option<Arc<V>>;

    /// Inserts or replaces the value for `key`.
    ///
    /// Replacing an existing key notifies the removal listener with the
    /// old value and does not reset the entry's standing with the
    /// eviction policy.
    fn put(&self, key: K, value: V);

    /// Stops background activity (eviction and stats timers).
    ///
    /// Idempotent; an in-flight timer tick may still complete. Contents
    /// remain readable after close.
    fn close(&self);
}
