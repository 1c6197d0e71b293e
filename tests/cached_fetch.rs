//! Integration tests for the public cached-fetch API against a mock server

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ibgefetch::cache::ManualClock;
use ibgefetch::{cache_key, CacheKey, CacheTtl, CachedFetcher, FetchError, RetryPolicy, TtlCache};

#[derive(Debug, PartialEq, Deserialize)]
struct Municipio {
    id: u64,
    nome: String,
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        ..RetryPolicy::default()
    }
}

#[tokio::test]
async fn test_composite_keys_share_one_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/localidades/estados/33/municipios"))
        .and(query_param("orderBy", "nome"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 3304557, "nome": "Rio de Janeiro"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::default());
    let fetcher = CachedFetcher::new(Client::new(), Arc::new(TtlCache::with_clock(clock)))
        .with_policy(fast_policy());
    let url = format!(
        "{}/v1/localidades/estados/33/municipios?orderBy=nome",
        server.uri()
    );

    // Same request described with parameters in a different order and representation
    let key_a = CacheKey::new("municipios").param("uf", 33).param("orderBy", "nome").build();
    let mut params = Map::new();
    params.insert("orderBy".into(), json!("nome"));
    params.insert("uf".into(), json!("33"));
    params.insert("distrito".into(), Value::Null);
    let key_b = cache_key("municipios", Some(&params));
    assert_eq!(key_a, key_b);

    let first: Vec<Municipio> = fetcher
        .cached_fetch_ttl(&url, &key_a, CacheTtl::Static)
        .await
        .unwrap();
    let second: Vec<Municipio> = fetcher
        .cached_fetch_ttl(&url, &key_b, CacheTtl::Static)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].id, 3304557);
    assert_eq!(first[0].nome, "Rio de Janeiro");
}

#[tokio::test]
async fn test_one_cache_serves_many_fetchers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(TtlCache::new());
    let quick = CachedFetcher::new(Client::new(), cache.clone()).with_policy(RetryPolicy::quick());
    let none = CachedFetcher::new(Client::new(), cache.clone()).with_policy(RetryPolicy::none());

    let a: Value = quick.cached_fetch(&server.uri(), "shared", 5).await.unwrap();
    let b: Value = none.cached_fetch(&server.uri(), "shared", 5).await.unwrap();

    assert_eq!(a, b);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_rate_limit_then_success_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .with_priority(2)
        .mount(&server)
        .await;

    let fetcher =
        CachedFetcher::new(Client::new(), Arc::new(TtlCache::new())).with_policy(fast_policy());

    let values: Vec<u32> = fetcher.cached_fetch(&server.uri(), "k", 1).await.unwrap();
    let again: Vec<u32> = fetcher.cached_fetch(&server.uri(), "k", 1).await.unwrap();

    assert_eq!(values, vec![1, 2, 3]);
    assert_eq!(again, values);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = CachedFetcher::new(Client::new(), Arc::new(TtlCache::new()));
    let err = fetcher
        .cached_fetch::<Value>(&server.uri(), "k", 1)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Http { status: 400, .. }));
    assert_eq!(err.status(), Some(400));
}
