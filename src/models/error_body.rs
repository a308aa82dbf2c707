use serde::{Deserialize, Serialize};

/// Error message with its stack frames, as embedded in stream records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub stack_trace: Vec<String>,
}

impl ErrorMessage {
    /// Stack frames rendered one per line
    pub fn trace(&self) -> String {
        self.stack_trace.join("\n")
    }
}

/// Error body returned with a non-2xx status, or as a `statement_error` entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(rename = "error_code", default)]
    pub error_code: i64,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub stack_trace: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_text: Option<String>,
}

impl ErrorBody {
    pub fn trace(&self) -> String {
        self.stack_trace.join("\n")
    }
}
