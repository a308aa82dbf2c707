//! Error types for ksql-link.
//!
//! Errors fall into five groups:
//!
//! - **Transport**: `NetworkError` (connection refused, timeout, TLS failure), passed
//!   through from reqwest unchanged
//! - **Protocol**: `DecodeError`, `InsufficientResponse`, `UnexpectedResponse`
//! - **Server**: `ServerError`, built from the structured error body
//! - **Dependency**: `DependencyError`, `SinkMismatch`, raised before any mutation
//! - **Stream I/O**: `Io`, classified by [`KsqlLinkError::is_transient`]
//!
//! Nothing in this crate retries. Every error reaches the caller.

use thiserror::Error;

/// Result type for ksql-link operations.
pub type Result<T> = std::result::Result<T, KsqlLinkError>;

/// Errors returned by the ksql-link client.
#[derive(Debug, Error)]
pub enum KsqlLinkError {
    /// Network-level failure reported by the HTTP client
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Invalid client configuration or request construction
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Statement could not be marshalled to JSON. Response bodies never map here.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A non-blank line of a streamed response was not a valid record
    #[error("Failed to decode stream line {line:?}: {source}")]
    DecodeError {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// Reading the response body failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structured error reported by the server
    #[error("Server error ({status_code}, code {error_code}): {message}")]
    ServerError {
        status_code: u16,
        error_code: i64,
        message: String,
        stack_trace: String,
    },

    /// The server answered with fewer response elements than required
    #[error("Insufficient response: expected at least one element for '{statement}'")]
    InsufficientResponse { statement: String },

    /// The server answered with a response kind the operation does not accept
    #[error("Unexpected response for '{statement}': expected {expected}, got {actual}")]
    UnexpectedResponse {
        statement: String,
        expected: &'static str,
        actual: String,
    },

    /// The resource still has a live consumer
    #[error("Cannot drop {resource}: query {query_id} reads from it")]
    DependencyError { resource: String, query_id: String },

    /// A writer's declared sinks differ from the resource being dropped
    #[error("Refusing to terminate {query_id}: sinks {sinks:?} do not match {expected}")]
    SinkMismatch {
        query_id: String,
        expected: String,
        sinks: Vec<String>,
    },

    /// A drop failed after some queries were already terminated
    #[error("Drop aborted after terminating {terminated:?}: {source}")]
    PartialDrop {
        terminated: Vec<String>,
        #[source]
        source: Box<KsqlLinkError>,
    },

    /// Broker administration failure
    #[error("Topic admin error: {0}")]
    AdminError(String),

    /// Background task failure
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl KsqlLinkError {
    /// Whether a stream read that failed with this error may be followed by more reads.
    ///
    /// Decode errors affect only their own line. I/O errors are transient when the
    /// connection is expected to recover (interrupted, would-block, timed out).
    pub fn is_transient(&self) -> bool {
        match self {
            KsqlLinkError::DecodeError { .. } => true,
            KsqlLinkError::Io(e) => is_transient_io(e),
            _ => false,
        }
    }

    /// Stack trace attached to a server error, if any.
    pub fn stack_trace(&self) -> Option<&str> {
        match self {
            KsqlLinkError::ServerError { stack_trace, .. } => Some(stack_trace),
            _ => None,
        }
    }
}

pub(crate) fn is_transient_io(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::Interrupted
            | std::io::ErrorKind::WouldBlock
            | std::io::ErrorKind::TimedOut
    )
}

impl From<serde_json::Error> for KsqlLinkError {
    fn from(err: serde_json::Error) -> Self {
        KsqlLinkError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_classification() {
        let timed_out = KsqlLinkError::Io(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert!(timed_out.is_transient());

        let reset = KsqlLinkError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(!reset.is_transient());
    }

    #[test]
    fn test_server_error_display() {
        let err = KsqlLinkError::ServerError {
            status_code: 400,
            error_code: 40001,
            message: "bad".into(),
            stack_trace: "l1".into(),
        };
        assert_eq!(err.to_string(), "Server error (400, code 40001): bad");
        assert_eq!(err.stack_trace(), Some("l1"));
    }

    #[test]
    fn test_dependency_errors_are_not_transient() {
        let err = KsqlLinkError::DependencyError {
            resource: "TARGET".into(),
            query_id: "Q2".into(),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("Q2"));
    }
}
