//! Cache module for keeping decoded API responses in memory
//!
//! This module provides the key builder used to identify requests and a
//! TTL cache that holds decoded JSON payloads until they expire. Nothing is
//! persisted; a fresh process starts with an empty cache.

mod clock;
mod key;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{cache_key, CacheKey};
pub use store::TtlCache;
