//! MovieMind Cache - response caching in front of movie metadata API calls
//!
//! Provides a capacity-bounded TTL cache with oldest-first eviction and a
//! background sweep, an exponential-backoff retry executor, and the request
//! key discipline that ties them together in a read-through fetch path.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod key;
pub mod retry;
pub mod tasks;
pub mod telemetry;

pub use cache::{CacheEntry, CacheStats, SharedCache, TtlCache};
pub use config::Config;
pub use error::{ConfigError, UpstreamError};
pub use fetcher::CachedFetcher;
pub use key::{RequestKey, TtlPolicy};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use tasks::spawn_cleanup_task;
