//! Eviction Module
//!
//! Oldest-first capacity eviction for the TTL cache.
//!
//! When an insert pushes the store over capacity, a batch of the oldest
//! entries (by insertion time) is removed at once rather than trimming to the
//! exact capacity, keeping the cost of eviction amortized across inserts.

use std::collections::HashMap;

use crate::cache::CacheEntry;

/// One eviction pass removes `1 / EVICTION_DIVISOR` of the store.
pub const EVICTION_DIVISOR: usize = 10;

// == Batch Size ==
/// Number of entries one eviction pass removes from a store of `len` entries.
///
/// `ceil(len * 0.1)`, never less than one.
pub fn eviction_batch_size(len: usize) -> usize {
    len.div_ceil(EVICTION_DIVISOR).max(1)
}

// == Select Oldest ==
/// Returns the keys of the `count` oldest entries, oldest first.
///
/// Entries are ordered by `stored_at`, then by insertion sequence.
pub fn select_oldest<T>(entries: &HashMap<String, CacheEntry<T>>, count: usize) -> Vec<String> {
    let mut by_age: Vec<(&String, &CacheEntry<T>)> = entries.iter().collect();
    by_age.sort_by_key(|(_, entry)| entry.age_key());

    by_age
        .into_iter()
        .take(count)
        .map(|(key, _)| key.clone())
        .collect()
}
