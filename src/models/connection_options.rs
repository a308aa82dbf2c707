use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::http_version::HttpVersion;

/// Connection pool options for the HTTP client.
///
/// Idle connections are bounded per host and reused across calls. Pooled
/// sockets that sit idle longer than `pool_idle_timeout_ms` are closed so a
/// hung server cannot pin them forever.
///
/// # Example
///
/// ```rust
/// use ksql_link::{ConnectionOptions, HttpVersion};
///
/// let options = ConnectionOptions::default()
///     .with_http_version(HttpVersion::Http1)
///     .with_pool_max_idle_per_host(16)
///     .with_pool_idle_timeout_ms(60_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// HTTP protocol version to use for connections
    /// Default: Http1
    #[serde(default)]
    pub http_version: HttpVersion,

    /// Maximum idle connections kept per host
    /// Default: 100
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// How long an idle pooled connection is kept, in milliseconds
    /// Default: 90000ms
    #[serde(default = "default_pool_idle_timeout_ms")]
    pub pool_idle_timeout_ms: u64,
}

fn default_pool_max_idle_per_host() -> usize {
    100
}

fn default_pool_idle_timeout_ms() -> u64 {
    90_000
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            http_version: HttpVersion::default(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            pool_idle_timeout_ms: default_pool_idle_timeout_ms(),
        }
    }
}

impl ConnectionOptions {
    /// Create new connection options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP protocol version to use
    pub fn with_http_version(mut self, version: HttpVersion) -> Self {
        self.http_version = version;
        self
    }

    pub fn with_pool_max_idle_per_host(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    pub fn with_pool_idle_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.pool_idle_timeout_ms = timeout_ms;
        self
    }

    pub(crate) fn pool_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.pool_idle_timeout_ms)
    }
}
