//! Command-line interface parsing for ibgefetch
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into a validated `RunConfig`.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::config::{resolve_url, CacheTtl, HttpConfig, RetryProfile};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A target was empty or whitespace
    #[error("Invalid target: '{0}'. Pass an absolute URL or a path such as v1/localidades/estados")]
    InvalidTarget(String),

    /// Timeout must be at least one second
    #[error("Invalid timeout: {0}. Timeout must be at least 1 second")]
    InvalidTimeout(u64),

    /// Repeat count must be at least one
    #[error("Invalid repeat count: {0}. Must be at least 1")]
    InvalidRepeat(u32),
}

/// ibgefetch - Fetch IBGE API data through a retrying, read-through cache
#[derive(Parser, Debug)]
#[command(name = "ibgefetch")]
#[command(about = "Fetch IBGE statistics API data with caching and retries")]
#[command(version)]
pub struct Cli {
    /// URLs or API paths to fetch
    ///
    /// Examples:
    ///   ibgefetch v1/localidades/estados
    ///   ibgefetch values/t/6579/n1/all/v/9324/p/last
    ///   ibgefetch https://servicodados.ibge.gov.br/api/v2/censos/nomes/maria
    #[arg(required = true, value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Cache lifetime class for fetched responses
    #[arg(long, value_enum, default_value_t = CacheTtl::Medium)]
    pub ttl: CacheTtl,

    /// Retry preset used on cache misses
    #[arg(long, value_enum, default_value_t = RetryProfile::Default)]
    pub retry: RetryProfile,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Fetch each target this many times (later fetches are served from cache)
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub repeat: u32,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,
}

/// Validated settings for a fetch run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Fully resolved URLs, in the order given
    pub urls: Vec<String>,
    pub ttl: CacheTtl,
    pub retry: RetryProfile,
    pub http: HttpConfig,
    pub repeat: u32,
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(RunConfig)` with every target resolved to a URL
    /// * `Err(CliError)` if a target, the timeout or the repeat count is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.timeout == 0 {
            return Err(CliError::InvalidTimeout(cli.timeout));
        }
        if cli.repeat == 0 {
            return Err(CliError::InvalidRepeat(cli.repeat));
        }

        let urls = cli
            .targets
            .iter()
            .map(|target| {
                let trimmed = target.trim();
                if trimmed.is_empty() {
                    Err(CliError::InvalidTarget(target.clone()))
                } else {
                    Ok(resolve_url(trimmed))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RunConfig {
            urls,
            ttl: cli.ttl,
            retry: cli.retry,
            http: HttpConfig {
                timeout: Duration::from_secs(cli.timeout),
                ..HttpConfig::default()
            },
            repeat: cli.repeat,
        })
    }
}
