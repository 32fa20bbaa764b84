//! Shared Cache Module
//!
//! Cloneable handle that lets every data-access component share one TTL cache
//! and ties the background sweep to the cache's own lifetime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::cache::{CacheStats, TtlCache};
use crate::config::Config;
use crate::tasks::spawn_cleanup_task;

#[derive(Debug)]
pub(crate) struct Shared<T> {
    store: Mutex<TtlCache<T>>,
    cleanup: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        let slot = self.cleanup.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

// == Shared Cache ==
/// Handle to a [`TtlCache`] shared between callers.
///
/// Clones point at the same store. Each operation takes the lock for its own
/// duration only and never across an `.await`, so operations stay
/// synchronous and run to completion.
#[derive(Debug)]
pub struct SharedCache<T> {
    inner: Arc<Shared<T>>,
}

impl<T> Clone for SharedCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedCache<T> {
    // == Constructors ==
    /// Wraps an existing store. No background sweep is started.
    pub fn from_store(store: TtlCache<T>) -> Self {
        Self {
            inner: Arc::new(Shared {
                store: Mutex::new(store),
                cleanup: Mutex::new(None),
            }),
        }
    }

    /// Creates an empty cache sized from `config` without a background sweep.
    pub fn new(config: &Config) -> Self {
        Self::from_store(TtlCache::from_config(config))
    }

    /// Creates an empty cache and starts its background sweep.
    ///
    /// Must be called from within a Tokio runtime. The sweep stops on
    /// [`destroy`](Self::destroy) or once every handle has been dropped.
    pub fn spawn(config: &Config) -> Self
    where
        T: Send + 'static,
    {
        let cache = Self::new(config);
        cache.start_cleanup(config.cleanup_interval());
        cache
    }

    /// Starts the background sweep, replacing any sweep already running.
    pub fn start_cleanup(&self, interval: Duration)
    where
        T: Send + 'static,
    {
        let handle = spawn_cleanup_task(self, interval);
        if let Some(previous) = self.cleanup_slot().replace(handle) {
            previous.abort();
        }
    }

    // == Cache Operations ==
    /// See [`TtlCache::set`].
    pub fn set(&self, key: impl Into<String>, data: T, ttl: Option<Duration>) {
        self.lock().set(key, data, ttl);
    }

    /// See [`TtlCache::get`].
    pub fn get(&self, key: &str) -> Option<T>
    where
        T: Clone,
    {
        self.lock().get(key)
    }

    /// See [`TtlCache::has`].
    pub fn has(&self, key: &str) -> bool {
        self.lock().has(key)
    }

    /// See [`TtlCache::delete`].
    pub fn delete(&self, key: &str) -> bool {
        self.lock().delete(key)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// See [`TtlCache::stats`].
    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    pub fn cleanup_expired(&self) -> usize {
        self.lock().cleanup_expired()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // == Destroy ==
    /// Stops the background sweep and drops every entry.
    ///
    /// Intended for orderly shutdown; the handle stays usable afterwards but
    /// without a sweep.
    pub fn destroy(&self) {
        if let Some(handle) = self.cleanup_slot().take() {
            handle.abort();
            warn!("Cache cleanup task aborted");
        }
        self.clear();
    }

    /// Whether a background sweep is attached and still running.
    pub fn is_cleanup_running(&self) -> bool {
        self.cleanup_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared<T>> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<Shared<T>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // The store is total, so a panic elsewhere never leaves it unusable.
    fn lock(&self) -> MutexGuard<'_, TtlCache<T>> {
        self.inner.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cleanup_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner.cleanup.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            max_entries: 10,
            ..Config::default()
        }
    }

    #[test]
    fn test_clones_share_the_store() {
        let cache: SharedCache<u32> = SharedCache::new(&config());
        let other = cache.clone();

        cache.set("movie_genres", 19, None);

        assert_eq!(other.get("movie_genres"), Some(19));
        assert_eq!(other.len(), 1);
        assert!(other.delete("movie_genres"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_new_has_no_cleanup_task() {
        let cache: SharedCache<u32> = SharedCache::new(&config());
        assert!(!cache.is_cleanup_running());
    }

    #[tokio::test]
    async fn test_spawn_starts_cleanup_task() {
        let cache: SharedCache<u32> = SharedCache::spawn(&config());
        assert!(cache.is_cleanup_running());

        cache.destroy();
        assert!(!cache.is_cleanup_running());
    }

    #[tokio::test]
    async fn test_destroy_clears_entries() {
        let cache: SharedCache<&'static str> = SharedCache::spawn(&config());
        cache.set("a", "1", None);
        cache.set("b", "2", None);

        cache.destroy();

        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_capacity_applies_through_handle() {
        let cache: SharedCache<usize> = SharedCache::new(&config());

        for i in 0..11 {
            cache.set(format!("k{i}"), i, None);
        }

        // 11 > 10 triggers eviction of ceil(1.1) = 2
        assert_eq!(cache.len(), 9);
        assert!(!cache.has("k0"));
        assert!(!cache.has("k1"));
        assert!(cache.has("k10"));
    }
}
