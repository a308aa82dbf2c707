//! Data models for the ksql-link client library.
//!
//! Request bodies, stream records, and the response entities of the
//! `/ksql`, `/query`, `/status` and `/info` endpoints.

pub mod command_status;
pub mod connection_options;
pub mod error_body;
pub mod http_version;
pub mod ksql_response;
pub mod resource_kind;
pub mod server_info;
pub mod server_record;
pub mod source_description;
pub mod statement;

#[cfg(test)]
mod tests;

pub use command_status::{CommandState, CommandStatus, StatusBody};
pub use connection_options::ConnectionOptions;
pub use error_body::{ErrorBody, ErrorMessage};
pub use http_version::HttpVersion;
pub use ksql_response::{DescribeEntity, KsqlResponse, QueryList, SourceList};
pub use resource_kind::ResourceKind;
pub use server_info::ServerInfo;
pub use server_record::ServerRecord;
pub use source_description::{FieldSchema, FieldType, QueryRef, SourceDescription, SourceInfo};
pub use statement::Statement;
