//! Main ksql-link client with builder pattern.
//!
//! Provides the primary interface for listing, describing, creating and
//! dropping resources, and for running streaming queries.

use async_trait::async_trait;
use log::debug;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    decoder::RecordDecoder,
    error::{KsqlLinkError, Result},
    models::{
        server_info::InfoBody, CommandStatus, ConnectionOptions, HttpVersion, KsqlResponse,
        QueryRef, ResourceKind, ServerInfo, ServerRecord, SourceDescription, SourceInfo,
        Statement, StatusBody,
    },
    query::{collect_records, forward_records, QueryHandle},
    resolver::{
        expect_description, expect_queries, expect_status, expect_streams, expect_tables,
        resolve_object, resolve_response, server_error,
    },
    seq_token::SequenceToken,
    sequencer::{DdlExecutor, DropOutcome, DropSequencer, ReaderPolicy},
    statements::{describe_query, terminate_query, CreateAsSelectRequest, CreateRequest},
    timeouts::KsqlLinkTimeouts,
    transport::{body_reader, HttpTransport},
};

const LIST_STREAMS: &str = "LIST STREAMS;";
const LIST_TABLES: &str = "LIST TABLES;";
const LIST_QUERIES: &str = "LIST QUERIES;";

/// Main ksql-link client.
///
/// Use [`KsqlLinkClientBuilder`] to construct instances with custom configuration.
/// Clones share the connection pool.
///
/// # Examples
///
/// ```rust,no_run
/// use ksql_link::KsqlLinkClient;
///
/// # async fn example() -> ksql_link::Result<()> {
/// let client = KsqlLinkClient::builder()
///     .base_url("http://localhost:8088")
///     .build()?;
///
/// for stream in client.list_streams().await? {
///     println!("{} -> {}", stream.name, stream.topic);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KsqlLinkClient {
    transport: HttpTransport,
    reader_policy: ReaderPolicy,
}

impl KsqlLinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> KsqlLinkClientBuilder {
        KsqlLinkClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Policy applied by [`drop_stream`](Self::drop_stream) and
    /// [`drop_table`](Self::drop_table) to reading queries
    pub fn reader_policy(&self) -> ReaderPolicy {
        self.reader_policy
    }

    /// Run any statement on the control endpoint and return every response entity.
    pub async fn execute(&self, statement: Statement) -> Result<Vec<KsqlResponse>> {
        let response = self.transport.post_ksql(&statement).await?;
        let status = response.status();
        let body = response.bytes().await?;
        resolve_response(status, &body, &statement.ksql)
    }

    /// Run a mutating statement and return its acknowledgement.
    pub async fn execute_command(&self, statement: Statement) -> Result<CommandStatus> {
        let text = statement.ksql.clone();
        let responses = self.execute(statement).await?;
        expect_status(responses, &text)
    }

    pub async fn list_streams(&self) -> Result<Vec<SourceInfo>> {
        let responses = self.execute(Statement::new(LIST_STREAMS)).await?;
        Ok(expect_streams(responses, LIST_STREAMS)?.sources)
    }

    pub async fn list_tables(&self) -> Result<Vec<SourceInfo>> {
        let responses = self.execute(Statement::new(LIST_TABLES)).await?;
        Ok(expect_tables(responses, LIST_TABLES)?.sources)
    }

    /// Running continuous queries
    pub async fn list_queries(&self) -> Result<Vec<QueryRef>> {
        let responses = self.execute(Statement::new(LIST_QUERIES)).await?;
        Ok(expect_queries(responses, LIST_QUERIES)?.queries)
    }

    /// Describe a stream or table, including the queries reading and writing it.
    pub async fn describe(&self, name: &str) -> Result<SourceDescription> {
        let text = describe_query(name);
        let responses = self.execute(Statement::new(text.as_str())).await?;
        expect_description(responses, &text)
    }

    /// # Example
    ///
    /// ```rust,no_run
    /// use ksql_link::{CreateRequest, KsqlLinkClient};
    ///
    /// # async fn example(client: KsqlLinkClient) -> ksql_link::Result<()> {
    /// let request = CreateRequest::stream("PAGEVIEWS")
    ///     .field("viewtime", "BIGINT")
    ///     .field("userid", "VARCHAR")
    ///     .setting("kafka_topic", "pageviews")
    ///     .setting("value_format", "JSON");
    /// let ack = client.create_stream(request).await?;
    /// println!("{} at {}", ack.state, ack.sequence);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_stream(&self, request: CreateRequest) -> Result<CommandStatus> {
        let request = CreateRequest {
            kind: ResourceKind::Stream,
            ..request
        };
        self.execute_command(request.to_statement()).await
    }

    pub async fn create_table(&self, request: CreateRequest) -> Result<CommandStatus> {
        let request = CreateRequest {
            kind: ResourceKind::Table,
            ..request
        };
        self.execute_command(request.to_statement()).await
    }

    /// `CREATE STREAM|TABLE ... AS SELECT`, which starts a continuous query.
    pub async fn create_as_select(&self, request: &CreateAsSelectRequest) -> Result<CommandStatus> {
        self.execute_command(Statement::new(request.query())).await
    }

    /// Terminate a continuous query once `after` has been applied.
    pub async fn terminate(&self, query_id: &str, after: SequenceToken) -> Result<CommandStatus> {
        self.execute_command(Statement::new(terminate_query(query_id)).after(after))
            .await
    }

    /// Terminate every query writing into the stream, then drop it.
    pub async fn drop_stream(&self, name: &str) -> Result<DropOutcome> {
        self.drop_resource(ResourceKind::Stream, name).await
    }

    /// Terminate every query writing into the table, then drop it.
    pub async fn drop_table(&self, name: &str) -> Result<DropOutcome> {
        self.drop_resource(ResourceKind::Table, name).await
    }

    async fn drop_resource(&self, kind: ResourceKind, name: &str) -> Result<DropOutcome> {
        DropSequencer::new(self)
            .with_policy(self.reader_policy)
            .drop_resource(kind, name)
            .await
    }

    /// Current state of a queued command
    pub async fn status(&self, command_id: &str) -> Result<CommandStatus> {
        let response = self.transport.get_status(command_id).await?;
        let status = response.status();
        let body = response.bytes().await?;
        let status_body: StatusBody =
            resolve_object(status, &body, "GET /status", "status body")?;
        Ok(CommandStatus::from_status_body(command_id, status_body))
    }

    pub async fn info(&self) -> Result<ServerInfo> {
        let response = self.transport.get_info().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let info: InfoBody = resolve_object(status, &body, "GET /info", "server info")?;
        Ok(info.server_info)
    }

    /// Stream the results of `statement` into `tx` until the server closes the
    /// stream, a fatal read error occurs, or `cancel` fires.
    ///
    /// A non-2xx answer is returned as a server error before any record is
    /// delivered. Malformed lines are logged and skipped.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ksql_link::{KsqlLinkClient, Statement};
    /// use tokio::sync::mpsc;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example(client: KsqlLinkClient) -> ksql_link::Result<()> {
    /// let (tx, mut rx) = mpsc::channel(64);
    /// let cancel = CancellationToken::new();
    /// let stop = cancel.clone();
    ///
    /// tokio::spawn(async move {
    ///     while let Some(record) = rx.recv().await {
    ///         println!("{:?}", record);
    ///     }
    ///     stop.cancel();
    /// });
    ///
    /// client
    ///     .query(Statement::new("SELECT * FROM PAGEVIEWS EMIT CHANGES;"), &tx, &cancel)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn query(
        &self,
        statement: Statement,
        tx: &mpsc::Sender<ServerRecord>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let label = statement.preview();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("[KSQL_QUERY] \"{}\" cancelled before the response arrived", label);
                return Ok(());
            }
            response = self.transport.post_query(&statement) => response?,
        };
        let response = check_stream_status(response).await?;

        let mut decoder = RecordDecoder::new(body_reader(response));
        forward_records(&mut decoder, tx, cancel, &label).await
    }

    /// Start a streaming query on its own task with a channel of `buffer` slots.
    pub async fn spawn_query(&self, statement: Statement, buffer: usize) -> Result<QueryHandle> {
        let response = self.transport.post_query(&statement).await?;
        let response = check_stream_status(response).await?;
        Ok(QueryHandle::spawn(
            body_reader(response),
            buffer,
            statement.preview(),
        ))
    }

    /// Collect every record of a query that is guaranteed to end, such as
    /// `SELECT ... LIMIT n`. Never use this for an open-ended query.
    pub async fn limit_query(&self, statement: Statement) -> Result<Vec<ServerRecord>> {
        let response = self.transport.post_query(&statement).await?;
        let response = check_stream_status(response).await?;
        let mut decoder = RecordDecoder::new(body_reader(response));
        collect_records(&mut decoder).await
    }
}

/// Pass a 2xx streaming response through; read any other body as a server error.
async fn check_stream_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await?;
    Err(server_error(status, &body))
}

#[async_trait]
impl DdlExecutor for KsqlLinkClient {
    async fn describe(&self, name: &str) -> Result<SourceDescription> {
        KsqlLinkClient::describe(self, name).await
    }

    async fn execute_command(&self, statement: Statement) -> Result<CommandStatus> {
        KsqlLinkClient::execute_command(self, statement).await
    }
}

/// Builder for configuring [`KsqlLinkClient`] instances.
pub struct KsqlLinkClientBuilder {
    base_url: Option<String>,
    timeouts: KsqlLinkTimeouts,
    connection_options: ConnectionOptions,
    reader_policy: ReaderPolicy,
}

impl KsqlLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            timeouts: KsqlLinkTimeouts::default(),
            connection_options: ConnectionOptions::default(),
            reader_policy: ReaderPolicy::default(),
        }
    }

    /// Set the base URL of the server, e.g. `http://localhost:8088`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set timeout configuration for all operations
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ksql_link::{KsqlLinkClient, KsqlLinkTimeouts};
    ///
    /// # fn example() -> ksql_link::Result<()> {
    /// let client = KsqlLinkClient::builder()
    ///     .base_url("http://localhost:8088")
    ///     .timeouts(KsqlLinkTimeouts::fast())
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn timeouts(mut self, timeouts: KsqlLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set connection pool and protocol options
    pub fn connection_options(mut self, options: ConnectionOptions) -> Self {
        self.connection_options = options;
        self
    }

    /// Set the HTTP protocol version to use
    ///
    /// - `HttpVersion::Http1` - HTTP/1.1 (default)
    /// - `HttpVersion::Http2` - HTTP/2 with prior knowledge
    /// - `HttpVersion::Auto` - Let the client negotiate with the server
    pub fn http_version(mut self, version: HttpVersion) -> Self {
        self.connection_options.http_version = version;
        self
    }

    /// What dropping a resource does about queries that read from it
    pub fn reader_policy(mut self, policy: ReaderPolicy) -> Self {
        self.reader_policy = policy;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<KsqlLinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| KsqlLinkError::ConfigurationError("base_url is required".into()))?;

        let transport = HttpTransport::new(&base_url, self.timeouts, &self.connection_options)?;
        debug!("[KSQL_HTTP] client ready for {}", transport.base_url());

        Ok(KsqlLinkClient {
            transport,
            reader_policy: self.reader_policy,
        })
    }
}
