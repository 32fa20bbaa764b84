//! Cached Fetch Module
//!
//! The read-through path every data-access call follows: look the request key
//! up in the shared cache, and only on a miss run the upstream call under the
//! retry policy, storing a successful result before returning it.

use std::future::Future;

use tracing::debug;

use crate::cache::SharedCache;
use crate::key::{RequestKey, TtlPolicy};
use crate::retry::RetryPolicy;

// == Cached Fetcher ==
/// Read-through cache in front of upstream calls.
///
/// Concurrent misses on the same key are not coalesced: each caller runs its
/// own upstream call and the last one to finish wins the cache slot.
#[derive(Debug, Clone)]
pub struct CachedFetcher<T> {
    cache: SharedCache<T>,
    retry: RetryPolicy,
}

impl<T: Clone> CachedFetcher<T> {
    pub fn new(cache: SharedCache<T>, retry: RetryPolicy) -> Self {
        Self { cache, retry }
    }

    pub fn cache(&self) -> &SharedCache<T> {
        &self.cache
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    // == Fetch ==
    /// Returns the cached value for `key`, or runs `operation` with retries,
    /// caches its result for `ttl` and returns it.
    ///
    /// A failed call leaves the cache untouched and returns the last error.
    pub async fn fetch<E, F, Fut>(
        &self,
        key: &RequestKey,
        ttl: impl Into<TtlPolicy>,
        operation: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.fetch_if(key, ttl, operation, |_| true).await
    }

    /// Like [`fetch`](Self::fetch), but only retries errors `should_retry`
    /// accepts, e.g. [`UpstreamError::is_retryable`](crate::UpstreamError::is_retryable).
    pub async fn fetch_if<E, F, Fut, P>(
        &self,
        key: &RequestKey,
        ttl: impl Into<TtlPolicy>,
        operation: F,
        should_retry: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        if let Some(hit) = self.cache.get(key.as_str()) {
            debug!(key = %key, "Cache hit");
            return Ok(hit);
        }

        debug!(key = %key, "Cache miss, fetching upstream");
        let value = self.retry.run_if(operation, should_retry).await?;

        let ttl = ttl.into().ttl();
        self.cache.set(key.as_str(), value.clone(), Some(ttl));
        debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Cached upstream response");

        Ok(value)
    }

    /// Drops the cached response for `key`, if any.
    pub fn invalidate(&self, key: &RequestKey) -> bool {
        self.cache.delete(key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use crate::error::UpstreamError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fetcher() -> CachedFetcher<String> {
        let cache = SharedCache::from_store(TtlCache::new(100, Duration::from_secs(300)));
        CachedFetcher::new(cache, RetryPolicy::new(3, Duration::from_millis(10)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_then_hit() {
        let fetcher = fetcher();
        let key = RequestKey::new("movie_details").param(42);
        let calls = AtomicU32::new(0);
        let op = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, UpstreamError>("Inception".to_string()) }
        };

        let first = fetcher.fetch(&key, TtlPolicy::Detail, op).await.unwrap();
        let second = fetcher.fetch(&key, TtlPolicy::Detail, op).await.unwrap();

        assert_eq!(first, "Inception");
        assert_eq!(second, "Inception");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(fetcher.cache().has("movie_details_42"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_not_cached() {
        let fetcher = fetcher();
        let key = RequestKey::new("popular_movies").param(1);

        let result = fetcher
            .fetch(&key, TtlPolicy::Listing, || async {
                Err::<String, _>(UpstreamError::status(500, "boom"))
            })
            .await;

        assert_eq!(result, Err(UpstreamError::status(500, "boom")));
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_if_skips_retry_on_permanent_error() {
        let fetcher = fetcher();
        let key = RequestKey::new("movie_details").param(0);
        let calls = AtomicU32::new(0);

        let result = fetcher
            .fetch_if(
                &key,
                TtlPolicy::Detail,
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<String, _>(UpstreamError::status(404, "")) }
                },
                UpstreamError::is_retryable,
            )
            .await;

        assert_eq!(result.unwrap_err().user_message(), "Resource not found.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_with_policy_ttl() {
        let fetcher = fetcher();
        let key = RequestKey::new("search_movies").param("alien").param(1);
        let calls = AtomicU32::new(0);
        let op = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, UpstreamError>("results".to_string()) }
        };

        fetcher.fetch(&key, TtlPolicy::Search, op).await.unwrap();
        tokio::time::advance(TtlPolicy::Search.ttl() + Duration::from_millis(1)).await;
        fetcher.fetch(&key, TtlPolicy::Search, op).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let fetcher = fetcher();
        let key = RequestKey::new("movie_genres");

        fetcher
            .fetch(&key, TtlPolicy::Reference, || async {
                Ok::<_, UpstreamError>("genres".to_string())
            })
            .await
            .unwrap();

        assert!(fetcher.invalidate(&key));
        assert!(!fetcher.invalidate(&key));
    }
}
