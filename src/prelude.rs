pub use crate::builder::LfuCacheBuilder;
pub use crate::ds::FrequencyIndex;
pub use crate::error::{ConfigError, EmptyCacheError};
pub use crate::listener::{
    LoggingRemovalListener, NoopRemovalListener, RemovalCause, RemovalListener,
};
pub use crate::service::lfu::LfuCacheService;
#[cfg(feature = "backend-moka")]
pub use crate::service::moka::{MokaCacheBuilder, MokaCacheService};
pub use crate::stats::{LoggingStatsSink, StatsSink, StatsSnapshot};
pub use crate::traits::CacheService;
