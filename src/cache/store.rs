//! In-memory TTL cache for decoded API responses
//!
//! Provides a `TtlCache` that keeps JSON payloads in memory with per-entry
//! expiry timestamps. Expiry is lazy: stale entries are ignored on read and
//! replaced on the next write, never swept in the background.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use super::clock::{Clock, SystemClock};

/// A cached payload and the instant after which it is stale
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached data
    value: Value,
    /// When the cache entry expires
    expires_at: DateTime<Utc>,
}

/// Mutex-guarded map from cache key to payload
///
/// Every operation takes the lock once and releases it before returning, so
/// `get`, `set` and `clear` are atomic with respect to each other.
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TtlCache {
    /// Creates an empty cache driven by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache driven by a custom clock
    ///
    /// Useful for testing expiry with a [`ManualClock`](super::ManualClock).
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Returns the stored value if present and not yet expired
    ///
    /// An expired entry reads the same as a missing one.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    /// Stores a value for `ttl_minutes`, replacing any existing entry
    pub fn set(&self, key: &str, value: Value, ttl_minutes: u64) {
        let ttl = Duration::try_minutes(ttl_minutes.min(i64::MAX as u64) as i64)
            .unwrap_or(Duration::MAX);
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries
            .lock()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    /// Drops every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
