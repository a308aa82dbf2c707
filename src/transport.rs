//! HTTP transport: request construction, protocol headers and the connection pool.

use bytes::Bytes;
use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::io;
use std::time::Instant;
use tokio_util::io::StreamReader;

use crate::{
    error::{KsqlLinkError, Result},
    models::{ConnectionOptions, HttpVersion, Statement},
    timeouts::KsqlLinkTimeouts,
};

/// Content type of every request body
pub const CONTENT_TYPE_V1: &str = "application/vnd.ksql.v1+json; charset=utf-8";

/// Protocol version the client accepts
pub const ACCEPT_V1: &str = "application/vnd.ksql.v1+json";

pub(crate) const KSQL_PATH: &str = "/ksql";
pub(crate) const QUERY_PATH: &str = "/query";
pub(crate) const STATUS_PATH: &str = "/status";
pub(crate) const INFO_PATH: &str = "/info";

/// Response body read incrementally as buffered lines.
pub type BodyReader = StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>;

/// Issues statements against the control and streaming endpoints.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
    timeouts: KsqlLinkTimeouts,
}

impl HttpTransport {
    pub(crate) fn new(
        base_url: &str,
        timeouts: KsqlLinkTimeouts,
        options: &ConnectionOptions,
    ) -> Result<Self> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| {
            KsqlLinkError::ConfigurationError(format!("invalid base_url '{}': {}", base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(KsqlLinkError::ConfigurationError(format!(
                "unsupported scheme '{}' in base_url",
                parsed.scheme()
            )));
        }

        // Bodies are newline-delimited and read a line at a time, so compression
        // stays off. No client-wide timeout: streaming bodies are open-ended.
        let mut client_builder = reqwest::Client::builder()
            .default_headers(default_headers())
            .connect_timeout(timeouts.connection_timeout)
            .tcp_keepalive(timeouts.tcp_keepalive)
            .pool_max_idle_per_host(options.pool_max_idle_per_host)
            .pool_idle_timeout(options.pool_idle_timeout())
            .no_gzip()
            .no_brotli()
            .no_deflate();

        client_builder = match options.http_version {
            HttpVersion::Http1 => {
                debug!("[KSQL_HTTP] Using HTTP/1.1 only");
                client_builder.http1_only()
            }
            HttpVersion::Http2 => {
                debug!("[KSQL_HTTP] Using HTTP/2 with prior knowledge");
                client_builder.http2_prior_knowledge()
            }
            HttpVersion::Auto => client_builder,
        };

        let http_client = client_builder
            .build()
            .map_err(|e| KsqlLinkError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a statement to the control endpoint. The whole exchange is bounded
    /// by the receive timeout.
    pub async fn post_ksql(&self, statement: &Statement) -> Result<reqwest::Response> {
        self.post(KSQL_PATH, statement, true).await
    }

    /// POST a statement to the streaming endpoint. The response body stays open
    /// until the server closes it or the caller drops it.
    pub async fn post_query(&self, statement: &Statement) -> Result<reqwest::Response> {
        self.post(QUERY_PATH, statement, false).await
    }

    pub async fn get_status(&self, command_id: &str) -> Result<reqwest::Response> {
        let url = self.url(STATUS_PATH);
        debug!("[KSQL_HTTP] GET {} commandID={}", url, command_id);
        let response = self
            .http_client
            .get(&url)
            .query(&[("commandID", command_id)])
            .timeout(self.timeouts.receive_timeout)
            .send()
            .await?;
        Ok(response)
    }

    pub async fn get_info(&self) -> Result<reqwest::Response> {
        let url = self.url(INFO_PATH);
        debug!("[KSQL_HTTP] GET {}", url);
        let response = self
            .http_client
            .get(&url)
            .timeout(self.timeouts.receive_timeout)
            .send()
            .await?;
        Ok(response)
    }

    async fn post(
        &self,
        path: &str,
        statement: &Statement,
        bounded: bool,
    ) -> Result<reqwest::Response> {
        // Marshal before touching the network so a bad statement never half-sends.
        let body = serde_json::to_vec(statement)?;
        let url = self.url(path);

        let mut request = self.http_client.post(&url).body(body);
        if bounded {
            request = request.timeout(self.timeouts.receive_timeout);
        }

        debug!(
            "[KSQL_HTTP] Sending POST to {}: \"{}\" (after command {})",
            url,
            statement.preview(),
            statement.prerequisite()
        );
        let start = Instant::now();
        let response = request.send().await?;
        debug!(
            "[KSQL_HTTP] Response received: status={} duration_ms={}",
            response.status(),
            start.elapsed().as_millis()
        );
        Ok(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_V1));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V1));
    headers
}

/// Adapt a streaming response body into a buffered reader of raw bytes.
pub fn body_reader(response: reqwest::Response) -> BodyReader {
    let stream = response
        .bytes_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        .boxed();
    StreamReader::new(stream)
}
