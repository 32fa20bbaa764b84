//! Cache Module
//!
//! Provides in-memory response caching with TTL expiration and oldest-first
//! eviction.

mod entry;
mod eviction;
mod shared;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use entry::{CacheEntry, MAX_TTL};
pub use eviction::{eviction_batch_size, EVICTION_DIVISOR};
pub use shared::SharedCache;
pub use stats::{CacheCounters, CacheStats};
pub use store::TtlCache;

// == Public Constants ==
/// Default capacity ceiling
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default time-to-live for entries stored without an explicit TTL
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default interval between background sweeps
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);
