//! Read-through cached JSON fetching
//!
//! `CachedFetcher` is the single primitive callers use to reach the IBGE
//! APIs: look the key up in the cache, and on a miss GET the URL with
//! retries, decode the JSON body and store it before returning.
//!
//! Concurrent misses on the same key are not coalesced. Each caller fetches
//! independently and the last write wins.

use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::cache::TtlCache;
use crate::config::CacheTtl;
use crate::http::{get_with_retry, FetchError, RetryPolicy};

/// Client that serves repeated requests from a shared TTL cache
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    /// HTTP client for making requests
    client: Client,
    /// Cache shared with every clone of this fetcher
    cache: Arc<TtlCache>,
    /// Retry behaviour for cache misses
    policy: RetryPolicy,
}

impl CachedFetcher {
    /// Creates a fetcher over `cache` using the default retry policy
    pub fn new(client: Client, cache: Arc<TtlCache>) -> Self {
        Self {
            client,
            cache,
            policy: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy used on cache misses
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url` as `T`, serving it from the cache under `key` when fresh
    ///
    /// # Arguments
    /// * `url` - Full request URL
    /// * `key` - Cache key, usually the URL or a [`CacheKey`](crate::cache::CacheKey)
    /// * `ttl_minutes` - How long a fetched value stays fresh
    ///
    /// # Returns
    /// * `Ok(T)` - From the cache on a hit, otherwise freshly fetched and cached
    /// * `Err(FetchError)` - Transport, status or decode failure; nothing is cached
    pub async fn cached_fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        key: &str,
        ttl_minutes: u64,
    ) -> Result<T, FetchError> {
        if let Some(value) = self.cache.get(key) {
            trace!(key, "cache hit");
            return Ok(<T as Deserialize>::deserialize(&value)?);
        }
        trace!(key, url, "cache miss");

        let value = self.fetch_value(url).await?;
        let decoded = <T as Deserialize>::deserialize(&value)?;
        self.cache.set(key, value, ttl_minutes);

        Ok(decoded)
    }

    /// Same as [`cached_fetch`](Self::cached_fetch) with the lifetime taken from a TTL class
    pub async fn cached_fetch_ttl<T: DeserializeOwned>(
        &self,
        url: &str,
        key: &str,
        ttl: CacheTtl,
    ) -> Result<T, FetchError> {
        self.cached_fetch(url, key, ttl.minutes()).await
    }

    /// Fetches and decodes `url` without touching the cache
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let value = self.fetch_value(url).await?;
        Ok(<T as Deserialize>::deserialize(&value)?)
    }

    async fn fetch_value(&self, url: &str) -> Result<Value, FetchError> {
        let response = get_with_retry(&self.client, url, &self.policy).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let text = response.text().await.map_err(FetchError::Body)?;
        Ok(serde_json::from_str(&text)?)
    }
}
