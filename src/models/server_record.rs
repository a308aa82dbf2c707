use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::convert::TryFrom;

use super::error_body::ErrorMessage;
use crate::error::{KsqlLinkError, Result};

/// One line of output from the streaming `/query` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRecord")]
pub enum ServerRecord {
    /// Result row; column values in projection order
    Row { columns: Vec<JsonValue> },

    /// Error the server reports in place of further rows
    Error(ErrorMessage),

    /// Closing message sent when a limited query has produced all its rows
    Final { message: String },
}

impl ServerRecord {
    /// Decode one line of the stream.
    ///
    /// Whitespace-only lines carry no record and return `Ok(None)`.
    pub fn decode_line(line: &[u8]) -> Result<Option<ServerRecord>> {
        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<ServerRecord>(trimmed)
            .map(Some)
            .map_err(|source| KsqlLinkError::DecodeError {
                line: trimmed.to_string(),
                source,
            })
    }

    pub fn columns(&self) -> Option<&[JsonValue]> {
        match self {
            ServerRecord::Row { columns } => Some(columns),
            _ => None,
        }
    }

    pub fn is_row(&self) -> bool {
        matches!(self, ServerRecord::Row { .. })
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ServerRecord::Final { .. })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(default)]
    row: Option<RawRow>,
    #[serde(default)]
    error_message: Option<ErrorMessage>,
    #[serde(default)]
    final_message: Option<String>,
}

#[derive(Deserialize)]
struct RawRow {
    #[serde(default)]
    columns: Vec<JsonValue>,
}

impl TryFrom<RawRecord> for ServerRecord {
    type Error = String;

    fn try_from(raw: RawRecord) -> std::result::Result<Self, String> {
        if let Some(row) = raw.row {
            return Ok(ServerRecord::Row { columns: row.columns });
        }
        if let Some(error) = raw.error_message {
            return Ok(ServerRecord::Error(error));
        }
        if let Some(message) = raw.final_message {
            return Ok(ServerRecord::Final { message });
        }
        Err("record carries neither row, errorMessage nor finalMessage".to_string())
    }
}
