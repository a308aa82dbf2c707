use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::command_status::CommandStatus;
use super::error_body::{ErrorBody, ErrorMessage};
use super::source_description::{QueryRef, SourceDescription, SourceInfo};

/// One element of a `/ksql` response array.
///
/// Each element is exactly one of these shapes. The shape is chosen by the
/// `@type` discriminant, or by the keys present when a server omits it.
#[derive(Debug, Clone, PartialEq)]
pub enum KsqlResponse {
    Streams(SourceList),
    Tables(SourceList),
    Queries(QueryList),
    SourceDescription(DescribeEntity),
    CurrentStatus(CommandStatus),
    StatementError(ErrorBody),
    /// Entity kind this client does not model (properties, topics, ...)
    Other { kind: String, body: JsonValue },
}

/// Payload of `LIST STREAMS` / `LIST TABLES`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceList {
    #[serde(default)]
    pub statement_text: String,

    #[serde(default, alias = "streams", alias = "tables")]
    pub sources: Vec<SourceInfo>,
}

/// Payload of `LIST QUERIES`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryList {
    #[serde(default)]
    pub statement_text: String,

    #[serde(default)]
    pub queries: Vec<QueryRef>,
}

/// Payload of `DESCRIBE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeEntity {
    #[serde(default)]
    pub statement_text: String,

    pub source_description: SourceDescription,
}

/// Older servers nest error entities as `{"error": {"statementText", "errorMessage"}}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyError {
    #[serde(default)]
    statement_text: String,
    #[serde(default)]
    error_message: ErrorMessage,
}

const STREAMS: &str = "streams";
const TABLES: &str = "tables";
const QUERIES: &str = "queries";
const SOURCE_DESCRIPTION: &str = "sourceDescription";
const CURRENT_STATUS: &str = "currentStatus";
const STATEMENT_ERROR: &str = "statement_error";
const LEGACY_ERROR: &str = "error";

impl KsqlResponse {
    /// Classify and decode one response element.
    pub fn from_value(value: JsonValue) -> Result<Self, serde_json::Error> {
        let JsonValue::Object(mut object) = value else {
            return Ok(KsqlResponse::Other {
                kind: "non-object".to_string(),
                body: value,
            });
        };

        let kind = match object.get("@type").and_then(JsonValue::as_str) {
            Some(kind) => kind.to_string(),
            None => infer_kind(&object),
        };

        // Older servers wrap the entity under a key named after its kind. A flat
        // describe entity also has an object under `sourceDescription`, so only
        // unwrap that one when the inner object nests the description again.
        if !object.contains_key("@type") {
            let wrapped = match object.get(kind.as_str()) {
                Some(JsonValue::Object(inner)) => {
                    kind != SOURCE_DESCRIPTION || inner.contains_key(SOURCE_DESCRIPTION)
                }
                _ => false,
            };
            if wrapped {
                if let Some(JsonValue::Object(inner)) = object.remove(kind.as_str()) {
                    object = inner;
                }
            }
        }
        let body = JsonValue::Object(object);

        let response = match kind.as_str() {
            STREAMS => KsqlResponse::Streams(serde_json::from_value(body)?),
            TABLES => KsqlResponse::Tables(serde_json::from_value(body)?),
            QUERIES => KsqlResponse::Queries(serde_json::from_value(body)?),
            SOURCE_DESCRIPTION => KsqlResponse::SourceDescription(serde_json::from_value(body)?),
            CURRENT_STATUS => KsqlResponse::CurrentStatus(serde_json::from_value(body)?),
            STATEMENT_ERROR => KsqlResponse::StatementError(serde_json::from_value(body)?),
            LEGACY_ERROR => {
                let legacy: LegacyError = serde_json::from_value(body)?;
                KsqlResponse::StatementError(ErrorBody {
                    kind: Some(STATEMENT_ERROR.to_string()),
                    error_code: 0,
                    message: legacy.error_message.message,
                    stack_trace: legacy.error_message.stack_trace,
                    statement_text: Some(legacy.statement_text),
                })
            }
            _ => {
                if body.get("error_code").and_then(JsonValue::as_i64).unwrap_or(0) != 0 {
                    KsqlResponse::StatementError(serde_json::from_value(body)?)
                } else {
                    KsqlResponse::Other { kind, body }
                }
            }
        };
        Ok(response)
    }

    /// Short name of the response kind, used in error messages
    pub fn kind(&self) -> &str {
        match self {
            KsqlResponse::Streams(_) => STREAMS,
            KsqlResponse::Tables(_) => TABLES,
            KsqlResponse::Queries(_) => QUERIES,
            KsqlResponse::SourceDescription(_) => SOURCE_DESCRIPTION,
            KsqlResponse::CurrentStatus(_) => CURRENT_STATUS,
            KsqlResponse::StatementError(_) => STATEMENT_ERROR,
            KsqlResponse::Other { kind, .. } => kind,
        }
    }
}

fn infer_kind(object: &Map<String, JsonValue>) -> String {
    let kind = if object.contains_key(SOURCE_DESCRIPTION) {
        SOURCE_DESCRIPTION
    } else if object.contains_key("commandStatus") || object.contains_key(CURRENT_STATUS) {
        CURRENT_STATUS
    } else if object.contains_key(STREAMS) {
        STREAMS
    } else if object.contains_key(TABLES) {
        TABLES
    } else if object.contains_key(QUERIES) {
        QUERIES
    } else if object.contains_key("error_code") {
        STATEMENT_ERROR
    } else if object.contains_key(LEGACY_ERROR) {
        LEGACY_ERROR
    } else {
        "unknown"
    };
    kind.to_string()
}
