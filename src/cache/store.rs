//! Cache Store Module
//!
//! Main cache engine: HashMap storage with absolute expiry, lazy expiry on
//! read and oldest-first capacity eviction.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cache::eviction::{eviction_batch_size, select_oldest};
use crate::cache::stats::CacheCounters;
use crate::cache::{CacheEntry, CacheStats, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use crate::config::Config;

// == TTL Cache ==
/// Capacity-bounded key/value store whose entries expire after a TTL.
///
/// Every operation is total: a missing or stale key is a normal `None`/`false`
/// result, never an error.
#[derive(Debug)]
pub struct TtlCache<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Cumulative counters
    counters: CacheCounters,
    /// Capacity ceiling that triggers eviction when exceeded
    max_entries: usize,
    /// TTL applied when `set` is called without one
    default_ttl: Duration,
    /// Next insertion sequence number
    next_sequence: u64,
}

impl<T> TtlCache<T> {
    // == Constructor ==
    /// Creates an empty cache with the given capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            counters: CacheCounters::default(),
            max_entries,
            default_ttl,
            next_sequence: 0,
        }
    }

    /// Creates an empty cache sized from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_entries, config.default_ttl())
    }

    // == Set ==
    /// Stores `data` under `key`, replacing any previous entry.
    ///
    /// `ttl` of `None` uses the default TTL. If the insert leaves the store
    /// over capacity, the oldest `ceil(len * 0.1)` entries are evicted.
    pub fn set(&mut self, key: impl Into<String>, data: T, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let entry = CacheEntry::new(data, ttl, Instant::now(), sequence);
        self.entries.insert(key.into(), entry);

        if self.entries.len() > self.max_entries {
            self.evict_oldest();
        }
    }

    // == Get ==
    /// Returns a clone of the value under `key` if present and not expired.
    ///
    /// A stale entry is removed on the spot and reported as a miss. Store an
    /// `Arc` as `T` to share the payload instead of copying it.
    pub fn get(&mut self, key: &str) -> Option<T>
    where
        T: Clone,
    {
        if !self.purge_if_expired(key) {
            self.counters.record_miss();
            return None;
        }

        self.counters.record_hit();
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    // == Has ==
    /// Returns whether a live entry exists under `key`, removing it if stale.
    pub fn has(&mut self, key: &str) -> bool {
        self.purge_if_expired(key)
    }

    // == Delete ==
    /// Removes the entry under `key`, returning whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Stats ==
    /// Takes a snapshot of the store without removing anything.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let expired = self
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .count();
        let keys = self.entries.keys().cloned().collect();

        CacheStats::new(keys, expired, self.counters)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - self.entries.len();
        self.counters.record_expirations(removed);
        removed
    }

    // == Length ==
    /// Returns the number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns true if `key` holds a live entry; drops it if stale.
    fn purge_if_expired(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(Instant::now()),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
            self.counters.record_expirations(1);
            debug!(key, "lazily removed expired entry");
        }
        !expired
    }

    fn evict_oldest(&mut self) {
        let count = eviction_batch_size(self.entries.len());
        let victims = select_oldest(&self.entries, count);

        for key in &victims {
            self.entries.remove(key);
        }

        self.counters.record_evictions(victims.len());
        debug!(
            evicted = victims.len(),
            remaining = self.entries.len(),
            max_entries = self.max_entries,
            "capacity eviction"
        );
    }
}

impl<T> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_TTL)
    }
}
