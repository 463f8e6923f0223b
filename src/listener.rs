//! Removal notification hooks.
//!
//! A [`RemovalListener`] is a single-method collaborator invoked
//! synchronously, inline with the mutation that removed an entry and
//! before the cache operation returns. Listeners are expected to be
//! side-effect-only (logging, metrics); a panicking listener is caught at
//! the call site, reported through `tracing`, and never rolls back the
//! bookkeeping that already committed.

use std::fmt::Debug;

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// Removed by capacity pressure or the forced-eviction timer.
    Evicted,
    /// The value was replaced by a `put` for the same key.
    Updated,
}

/// Callback invoked whenever an entry leaves the cache.
pub trait RemovalListener<K, V> {
    fn on_removal(&self, key: &K, value: &V, cause: RemovalCause);
}

/// Listener that ignores all removals. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRemovalListener;

impl<K, V> RemovalListener<K, V> for NoopRemovalListener {
    fn on_removal(&self, _key: &K, _value: &V, _cause: RemovalCause) {}
}

/// Listener that logs every removal at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRemovalListener;

impl<K, V> RemovalListener<K, V> for LoggingRemovalListener
where
    K: Debug,
    V: Debug,
{
    fn on_removal(&self, key: &K, value: &V, cause: RemovalCause) {
        tracing::info!(?key, ?value, ?cause, "removed entry");
    }
}
