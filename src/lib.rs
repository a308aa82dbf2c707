//! # ksql-link
//!
//! Async HTTP client for ksqlDB-style streaming SQL servers.
//!
//! ## Features
//!
//! - **Control statements**: list, describe, create and terminate over `POST /ksql`
//! - **Streaming queries**: newline-delimited results from `POST /query`, delivered
//!   in order through a bounded channel and stoppable with a `CancellationToken`
//! - **Sequenced drops**: terminate the queries writing into a stream or table, then
//!   drop it, each command ordered after the previous one by its sequence token
//! - **Typed errors**: server error bodies, protocol mismatches and dependency
//!   conflicts all surface as [`KsqlLinkError`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use ksql_link::{KsqlLinkClient, Statement};
//!
//! # async fn example() -> ksql_link::Result<()> {
//! let client = KsqlLinkClient::builder()
//!     .base_url("http://localhost:8088")
//!     .build()?;
//!
//! let rows = client
//!     .limit_query(Statement::new("SELECT * FROM PAGEVIEWS EMIT CHANGES LIMIT 3;"))
//!     .await?;
//! for row in rows {
//!     println!("{:?}", row.columns());
//! }
//!
//! let outcome = client.drop_stream("PAGEVIEWS_FILTERED").await?;
//! println!("terminated {:?} before the drop", outcome.terminated);
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod client;
pub mod decoder;
pub mod error;
pub mod models;
pub mod normalize;
pub mod query;
pub mod resolver;
pub mod seq_token;
pub mod sequencer;
pub mod statements;
pub mod timeouts;
pub mod transport;

pub use admin::{MemoryTopicAdmin, Topic, TopicAdmin};
pub use client::{KsqlLinkClient, KsqlLinkClientBuilder};
pub use decoder::RecordDecoder;
pub use error::{KsqlLinkError, Result};
pub use models::{
    CommandState, CommandStatus, ConnectionOptions, ErrorBody, ErrorMessage, FieldSchema,
    FieldType, HttpVersion, KsqlResponse, QueryRef, ResourceKind, ServerInfo, ServerRecord,
    SourceDescription, SourceInfo, Statement,
};
pub use query::QueryHandle;
pub use seq_token::SequenceToken;
pub use sequencer::{DdlExecutor, DropOutcome, DropSequencer, ReaderPolicy};
pub use statements::{CreateAsSelectRequest, CreateRequest};
pub use timeouts::{KsqlLinkTimeouts, KsqlLinkTimeoutsBuilder};
