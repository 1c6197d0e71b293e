//! ibgefetch library
//!
//! Read-through cached, retrying access to the IBGE statistics APIs. Tool
//! handlers build a URL and a cache key, then call
//! [`CachedFetcher::cached_fetch`](fetch::CachedFetcher::cached_fetch).

pub mod cache;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod http;

pub use cache::{cache_key, CacheKey, TtlCache};
pub use config::CacheTtl;
pub use fetch::CachedFetcher;
pub use http::{fetch_with_retry, FetchError, RetryPolicy};
