//! Error types for the lfukit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are
//!   invalid (e.g. zero capacity, zero intervals).
//! - [`EmptyCacheError`]: Returned when eviction is requested on an empty
//!   cache. The eviction scheduler invokes eviction unconditionally, so
//!   this condition is surfaced loudly rather than silently ignored.
//!
//! Cache misses are not errors anywhere in this crate: `get` on an absent
//! key returns `None`.
//!
//! ## Example Usage
//!
//! ```
//! use lfukit::builder::LfuCacheBuilder;
//! use lfukit::error::ConfigError;
//!
//! let err = LfuCacheBuilder::<u64, String>::new()
//!     .max_entries(0)
//!     .try_build()
//!     .unwrap_err();
//! assert!(err.to_string().contains("max_entries"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`LfuCacheBuilder::try_build`](crate::builder::LfuCacheBuilder::try_build)
/// and the moka backend builder. Carries a human-readable description of
/// which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// EmptyCacheError
// ---------------------------------------------------------------------------

/// Error returned when an eviction is requested while the cache holds no
/// entries.
///
/// The periodic eviction task calls evict on every tick without checking
/// fullness, so an empty cache is an expected condition there; the task
/// logs the error and skips the tick. For direct callers it signals a
/// logic error rather than succeeding silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyCacheError;

impl fmt::Display for EmptyCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("eviction requested on an empty cache")
    }
}

impl std::error::Error for EmptyCacheError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
