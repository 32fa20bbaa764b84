//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with absolute expiry.

use std::time::Duration;

use tokio::time::Instant;

/// Longest lifetime an entry can get, roughly 30 years
pub const MAX_TTL: Duration = Duration::from_secs(86_400 * 365 * 30);

// == Cache Entry ==
/// A single cached payload with its insertion and expiry instants.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached payload, opaque to the cache
    pub data: T,
    /// Insertion time, used only for eviction ordering
    pub stored_at: Instant,
    /// Absolute expiry, `stored_at + ttl`
    pub expires_at: Instant,
    /// Insertion counter, breaks `stored_at` ties in insertion order
    pub sequence: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stored at `now` that expires after `ttl`.
    ///
    /// The caller is responsible for a positive `ttl`; with a zero TTL the
    /// entry is only valid at the instant it was stored. A TTL too large to
    /// represent is capped at [`MAX_TTL`].
    pub fn new(data: T, ttl: Duration, now: Instant, sequence: u64) -> Self {
        let expires_at = now
            .checked_add(ttl.min(MAX_TTL))
            .unwrap_or_else(|| now + Duration::from_secs(86_400));

        Self {
            data,
            stored_at: now,
            expires_at,
            sequence,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is stale at `now`.
    ///
    /// An entry stays readable up to and including its expiry instant and is
    /// expired strictly after it.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    /// Checks whether the entry is stale right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns the time left before expiry, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Orders entries oldest first, insertion order on equal timestamps.
    pub(crate) fn age_key(&self) -> (Instant, u64) {
        (self.stored_at, self.sequence)
    }
}
