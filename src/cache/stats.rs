//! Cache Statistics Module
//!
//! Point-in-time diagnostic snapshots plus cumulative hit/miss/eviction counters.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Counters ==
/// Cumulative counters kept by the store across its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCounters {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that found nothing or found a stale entry
    pub misses: u64,
    /// Entries removed by capacity eviction
    pub evictions: u64,
    /// Stale entries removed lazily or by the background sweep
    pub expirations: u64,
}

impl CacheCounters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

// == Cache Stats ==
/// Read-only snapshot of the cache contents.
///
/// `expired` counts entries past their expiry that no read or sweep has
/// removed yet, so `valid = size - expired`. Taking a snapshot never evicts.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Number of stored entries, stale ones included
    pub size: usize,
    /// Stored entries already past their expiry
    pub expired: usize,
    /// Stored entries still readable
    pub valid: usize,
    /// Every stored key
    pub keys: Vec<String>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    /// Wall-clock time the snapshot was taken
    pub generated_at: DateTime<Utc>,
}

impl CacheStats {
    // == Constructor ==
    /// Builds a snapshot from the store's current shape and counters.
    pub fn new(keys: Vec<String>, expired: usize, counters: CacheCounters) -> Self {
        let size = keys.len();
        Self {
            size,
            expired,
            valid: size.saturating_sub(expired),
            keys,
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            expirations: counters.expirations,
            generated_at: Utc::now(),
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing has been read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Whether the snapshot lists `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}
