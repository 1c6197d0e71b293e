//! ibgefetch - Fetch IBGE statistics API data from the command line
//!
//! Every target goes through the same cached, retrying fetcher the tool
//! layer uses, so `--repeat` shows cache hits and `RUST_LOG=debug` shows
//! retry decisions.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures::future::join_all;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ibgefetch::cli::{Cli, RunConfig};
use ibgefetch::{CachedFetcher, FetchError, TtlCache};

/// Installs a stderr logger filtered by RUST_LOG, or `default_level` when unset
fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Fetches one URL `repeat` times, returning the last result
async fn fetch_target(
    fetcher: &CachedFetcher,
    url: &str,
    ttl_minutes: u64,
    repeat: u32,
) -> Result<Value, FetchError> {
    let mut last = fetcher.cached_fetch::<Value>(url, url, ttl_minutes).await;
    for _ in 1..repeat {
        last = fetcher.cached_fetch::<Value>(url, url, ttl_minutes).await;
    }
    last
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    init_tracing(&cli.log_level);

    let client = config.http.build_client()?;
    let fetcher = CachedFetcher::new(client, Arc::new(TtlCache::new()))
        .with_policy(config.retry.policy());
    tracing::debug!(retry = %config.retry, ttl_minutes = config.ttl.minutes(), "fetcher ready");

    let results = join_all(
        config
            .urls
            .iter()
            .map(|url| fetch_target(&fetcher, url, config.ttl.minutes(), config.repeat)),
    )
    .await;

    let show_headers = config.urls.len() > 1;
    let mut failed = false;
    for (url, result) in config.urls.iter().zip(results) {
        if show_headers {
            println!("==> {} <==", url);
        }
        match result {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(e) => {
                failed = true;
                eprintln!("error: {}: {}", url, e);
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
