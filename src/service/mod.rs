//! Cache service backends.
//!
//! [`lfu`] is the custom engine this crate exists for; [`moka`] wraps a
//! general-purpose caching library behind the same
//! [`CacheService`](crate::traits::CacheService) contract.

pub mod lfu;

#[cfg(feature = "backend-moka")]
pub mod moka;

pub use lfu::LfuCacheService;
#[cfg(feature = "backend-moka")]
pub use moka::{MokaCacheBuilder, MokaCacheService};
