//! Response union resolution for the control endpoint.
//!
//! A 2xx status selects the success schema (a JSON array of entities); any
//! other status selects the error schema. An entity that itself reports an
//! error is surfaced the same way as an error status.

use log::warn;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::{
    error::{KsqlLinkError, Result},
    models::{CommandStatus, ErrorBody, KsqlResponse, QueryList, SourceDescription, SourceList},
};

/// Resolve a complete `/ksql` response body into its entities.
///
/// Never returns an empty vector: a success array with no elements is
/// [`KsqlLinkError::InsufficientResponse`].
pub fn resolve_response(
    status: StatusCode,
    body: &[u8],
    statement_text: &str,
) -> Result<Vec<KsqlResponse>> {
    if !status.is_success() {
        return Err(server_error(status, body));
    }

    let elements: Vec<JsonValue> = serde_json::from_slice(body).map_err(|e| {
        KsqlLinkError::UnexpectedResponse {
            statement: statement_text.to_string(),
            expected: "JSON array",
            actual: e.to_string(),
        }
    })?;
    if elements.is_empty() {
        return Err(KsqlLinkError::InsufficientResponse {
            statement: statement_text.to_string(),
        });
    }

    let mut responses = Vec::with_capacity(elements.len());
    for element in elements {
        let response = KsqlResponse::from_value(element).map_err(|e| {
            KsqlLinkError::UnexpectedResponse {
                statement: statement_text.to_string(),
                expected: "response entity",
                actual: e.to_string(),
            }
        })?;
        if let KsqlResponse::StatementError(error) = response {
            warn!(
                "[KSQL_HTTP] Statement error: code={} message=\"{}\"",
                error.error_code, error.message
            );
            return Err(error_from_body(status.as_u16(), error));
        }
        responses.push(response);
    }
    Ok(responses)
}

/// Decode the body of a non-2xx response into a typed server error.
pub fn server_error(status: StatusCode, body: &[u8]) -> KsqlLinkError {
    let error = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(error) if !error.message.is_empty() || error.error_code != 0 => error,
        _ => ErrorBody {
            error_code: i64::from(status.as_u16()),
            message: String::from_utf8_lossy(body).trim().to_string(),
            ..ErrorBody::default()
        },
    };
    warn!(
        "[KSQL_HTTP] Server error: status={} code={} message=\"{}\"",
        status, error.error_code, error.message
    );
    error_from_body(status.as_u16(), error)
}

fn error_from_body(status_code: u16, error: ErrorBody) -> KsqlLinkError {
    let stack_trace = error.trace();
    KsqlLinkError::ServerError {
        status_code,
        error_code: error.error_code,
        message: error.message,
        stack_trace,
    }
}

/// Decode a single JSON object body (`/status`, `/info`) after checking the status.
///
/// `request` names the call in errors; `expected` names the body shape.
pub(crate) fn resolve_object<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    request: &str,
    expected: &'static str,
) -> Result<T> {
    if !status.is_success() {
        return Err(server_error(status, body));
    }
    serde_json::from_slice(body).map_err(|e| KsqlLinkError::UnexpectedResponse {
        statement: request.to_string(),
        expected,
        actual: e.to_string(),
    })
}

fn unexpected(statement: &str, expected: &'static str, actual: &KsqlResponse) -> KsqlLinkError {
    KsqlLinkError::UnexpectedResponse {
        statement: statement.to_string(),
        expected,
        actual: actual.kind().to_string(),
    }
}

/// First entity of a resolved response.
fn first(responses: Vec<KsqlResponse>, statement: &str) -> Result<KsqlResponse> {
    responses
        .into_iter()
        .next()
        .ok_or_else(|| KsqlLinkError::InsufficientResponse {
            statement: statement.to_string(),
        })
}

pub(crate) fn expect_streams(responses: Vec<KsqlResponse>, statement: &str) -> Result<SourceList> {
    match first(responses, statement)? {
        KsqlResponse::Streams(list) => Ok(list),
        other => Err(unexpected(statement, "streams", &other)),
    }
}

pub(crate) fn expect_tables(responses: Vec<KsqlResponse>, statement: &str) -> Result<SourceList> {
    match first(responses, statement)? {
        KsqlResponse::Tables(list) => Ok(list),
        other => Err(unexpected(statement, "tables", &other)),
    }
}

pub(crate) fn expect_queries(responses: Vec<KsqlResponse>, statement: &str) -> Result<QueryList> {
    match first(responses, statement)? {
        KsqlResponse::Queries(list) => Ok(list),
        other => Err(unexpected(statement, "queries", &other)),
    }
}

pub(crate) fn expect_description(
    responses: Vec<KsqlResponse>,
    statement: &str,
) -> Result<SourceDescription> {
    match first(responses, statement)? {
        KsqlResponse::SourceDescription(entity) => Ok(entity.source_description),
        other => Err(unexpected(statement, "sourceDescription", &other)),
    }
}

pub(crate) fn expect_status(
    responses: Vec<KsqlResponse>,
    statement: &str,
) -> Result<CommandStatus> {
    match first(responses, statement)? {
        KsqlResponse::CurrentStatus(status) => Ok(status),
        other => Err(unexpected(statement, "currentStatus", &other)),
    }
}
