//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries, so keys
//! written once and never read again do not pile up until capacity eviction.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task sleeps for `interval` between sweeps and holds only a weak
/// reference to the cache: it exits on its own once every [`SharedCache`]
/// handle has been dropped. [`SharedCache::destroy`] aborts it earlier.
///
/// # Example
/// ```ignore
/// let cache = SharedCache::new(&Config::default());
/// let cleanup_handle = spawn_cleanup_task(&cache, Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<T>(cache: &SharedCache<T>, interval: Duration) -> JoinHandle<()>
where
    T: Send + 'static,
{
    let weak = cache.downgrade();

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(cache) = SharedCache::upgrade(&weak) else {
                debug!("Cache dropped, stopping TTL cleanup task");
                break;
            };
            let removed = cache.cleanup_expired();
            drop(cache);

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
