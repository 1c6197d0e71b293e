//! Configuration: TTL classes, retry profiles, upstream URLs and HTTP settings

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use reqwest::Client;

use crate::http::RetryPolicy;

/// IBGE service-data API (localidades, agregados, nomes, ...)
pub const SERVICODADOS_BASE_URL: &str = "https://servicodados.ibge.gov.br/api";

/// SIDRA table API
pub const SIDRA_BASE_URL: &str = "https://apisidra.ibge.gov.br";

/// How long a class of response stays fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CacheTtl {
    /// Reference tables that rarely change (states, municipalities)
    Static,
    /// Slow-changing aggregates
    #[default]
    Medium,
    /// Frequently updated series
    Short,
    /// Near real-time data
    Realtime,
}

impl CacheTtl {
    /// Lifetime in minutes
    pub fn minutes(self) -> u64 {
        match self {
            CacheTtl::Static => 24 * 60,
            CacheTtl::Medium => 60,
            CacheTtl::Short => 15,
            CacheTtl::Realtime => 1,
        }
    }
}

/// Named retry presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RetryProfile {
    #[default]
    Default,
    /// For calls that must succeed
    Aggressive,
    /// For latency-sensitive, best-effort calls
    Quick,
    /// Single attempt, for callers with their own fallback
    #[value(name = "none")]
    NoRetry,
}

impl RetryProfile {
    pub fn policy(self) -> RetryPolicy {
        match self {
            RetryProfile::Default => RetryPolicy::default(),
            RetryProfile::Aggressive => RetryPolicy::aggressive(),
            RetryProfile::Quick => RetryPolicy::quick(),
            RetryProfile::NoRetry => RetryPolicy::none(),
        }
    }
}

impl fmt::Display for RetryProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RetryProfile::Default => "default",
            RetryProfile::Aggressive => "aggressive",
            RetryProfile::Quick => "quick",
            RetryProfile::NoRetry => "none",
        };
        f.write_str(name)
    }
}

/// Settings for the underlying HTTP client
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout enforced by reqwest; retries do not add their own
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("ibgefetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn build_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
    }
}

/// Turns a path into a full URL on the matching IBGE API
///
/// Absolute `http(s)://` URLs are returned unchanged. SIDRA table queries
/// (`values/...`) go to the SIDRA host, everything else to service-data.
pub fn resolve_url(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let path = path.trim_start_matches('/');
    let base = if path.starts_with("values/") {
        SIDRA_BASE_URL
    } else {
        SERVICODADOS_BASE_URL
    };
    format!("{}/{}", base, path)
}
