//! Timeout configuration for ksql-link operations.
//!
//! Control requests (`/ksql`, `/status`, `/info`) are bounded by
//! `receive_timeout`. Streaming requests (`/query`) only get the connect
//! timeout because their bodies are open-ended.

use std::time::Duration;

/// Timeout configuration for ksql-link operations.
///
/// # Examples
///
/// ```rust
/// use ksql_link::KsqlLinkTimeouts;
/// use std::time::Duration;
///
/// let timeouts = KsqlLinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(60))
///     .receive_timeout(Duration::from_secs(120))
///     .build();
///
/// let timeouts = KsqlLinkTimeouts::fast();
/// ```
#[derive(Debug, Clone)]
pub struct KsqlLinkTimeouts {
    /// Timeout for establishing connections (TCP connect + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for a complete control request/response exchange.
    /// Default: 30 seconds
    pub receive_timeout: Duration,

    /// TCP keepalive interval for pooled connections.
    /// Default: 30 seconds
    pub tcp_keepalive: Duration,
}

impl Default for KsqlLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(30),
            tcp_keepalive: Duration::from_secs(30),
        }
    }
}

impl KsqlLinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> KsqlLinkTimeoutsBuilder {
        KsqlLinkTimeoutsBuilder::new()
    }

    /// Short timeouts for a server on localhost.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            receive_timeout: Duration::from_secs(5),
            tcp_keepalive: Duration::from_secs(15),
        }
    }

    /// Long timeouts for remote or slow clusters.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            receive_timeout: Duration::from_secs(120),
            tcp_keepalive: Duration::from_secs(60),
        }
    }
}

/// Builder for [`KsqlLinkTimeouts`].
#[derive(Debug, Clone)]
pub struct KsqlLinkTimeoutsBuilder {
    timeouts: KsqlLinkTimeouts,
}

impl KsqlLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: KsqlLinkTimeouts::default(),
        }
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.receive_timeout = timeout;
        self
    }

    pub fn tcp_keepalive(mut self, interval: Duration) -> Self {
        self.timeouts.tcp_keepalive = interval;
        self
    }

    pub fn build(self) -> KsqlLinkTimeouts {
        self.timeouts
    }
}
