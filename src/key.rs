//! Request Key Module
//!
//! Canonical cache keys for upstream requests and the TTL conventions that go
//! with them.
//!
//! Two requests that mean the same thing must map to byte-identical keys, and
//! different requests should not collide. Keys are `<operation>_<p1>_<p2>...`
//! with positional parameters in declaration order, or `<operation>_<json>`
//! for parameter objects, whose JSON is rendered with sorted field names.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

// == Request Key ==
/// Deterministic cache key for one logical upstream request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    /// Starts a key for `operation`, e.g. `"search_movies"`.
    pub fn new(operation: impl Into<String>) -> Self {
        Self(operation.into())
    }

    /// Appends a positional parameter.
    pub fn param(mut self, value: impl fmt::Display) -> Self {
        use fmt::Write;
        // Writing into a String cannot fail
        let _ = write!(self.0, "_{value}");
        self
    }

    /// Builds `<operation>_<json>` from a parameter object.
    ///
    /// Field names are sorted, so parameter objects that differ only in field
    /// order produce the same key. Absent optional fields should be skipped
    /// (`#[serde(skip_serializing_if = "Option::is_none")]`) or rendered as
    /// `null` consistently by the caller's type.
    pub fn with_params<P>(operation: impl Into<String>, params: &P) -> Result<Self, serde_json::Error>
    where
        P: Serialize + ?Sized,
    {
        let canonical = canonicalize(serde_json::to_value(params)?);
        Ok(Self::new(operation).param(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rebuilds every JSON object with its fields in sorted order.
///
/// `serde_json::Map` keeps insertion order when the `preserve_order` feature
/// is enabled anywhere in the build, so ordering is not left to the map type.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(String, Value)> = map.into_iter().collect();
            fields.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, canonicalize(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<RequestKey> for String {
    fn from(key: RequestKey) -> Self {
        key.0
    }
}

// == TTL Policy ==
/// How long a response stays fresh, by how often the upstream data changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlPolicy {
    /// Search results: 5 minutes
    Search,
    /// Filtered discovery listings: 10 minutes
    Discover,
    /// Trending and popular listings: 15 minutes
    Listing,
    /// Movie details, credits, videos, reviews, similar titles: 30 minutes
    Detail,
    /// Supplementary ratings looked up by IMDb id: 60 minutes
    Ratings,
    /// Near-immutable reference data such as the genre list: 24 hours
    Reference,
    /// Any other lifetime
    Custom(Duration),
}

impl TtlPolicy {
    pub fn ttl(self) -> Duration {
        const MINUTE: u64 = 60;
        match self {
            TtlPolicy::Search => Duration::from_secs(5 * MINUTE),
            TtlPolicy::Discover => Duration::from_secs(10 * MINUTE),
            TtlPolicy::Listing => Duration::from_secs(15 * MINUTE),
            TtlPolicy::Detail => Duration::from_secs(30 * MINUTE),
            TtlPolicy::Ratings => Duration::from_secs(60 * MINUTE),
            TtlPolicy::Reference => Duration::from_secs(24 * 60 * MINUTE),
            TtlPolicy::Custom(ttl) => ttl,
        }
    }
}

impl From<Duration> for TtlPolicy {
    fn from(ttl: Duration) -> Self {
        TtlPolicy::Custom(ttl)
    }
}
