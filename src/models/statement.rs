use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::seq_token::SequenceToken;

/// Request body for the `/ksql` and `/query` endpoints.
///
/// # Examples
///
/// ```rust
/// use ksql_link::{SequenceToken, Statement};
///
/// let statement = Statement::new("DROP STREAM PAGEVIEWS;")
///     .after(SequenceToken::new(42))
///     .with_property("ksql.streams.auto.offset.reset", "earliest");
///
/// assert_eq!(statement.prerequisite(), SequenceToken::new(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Statement text, terminated with `;`
    pub ksql: String,

    /// Per-statement streams properties
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub streams_properties: BTreeMap<String, String>,

    /// Command that must be applied before this statement runs.
    /// Zero is omitted from the wire body.
    #[serde(default, skip_serializing_if = "SequenceToken::is_zero")]
    pub command_sequence_number: SequenceToken,
}

impl Statement {
    pub fn new(ksql: impl Into<String>) -> Self {
        Self {
            ksql: ksql.into(),
            streams_properties: BTreeMap::new(),
            command_sequence_number: SequenceToken::ZERO,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.streams_properties.insert(key.into(), value.into());
        self
    }

    /// Order this statement after `token`. Earlier tokens are ignored.
    pub fn after(mut self, token: SequenceToken) -> Self {
        self.command_sequence_number.advance(token);
        self
    }

    /// Order this statement after every command in `chain`.
    pub fn coordinate_in_sequence(&mut self, chain: &[SequenceToken]) {
        let latest = SequenceToken::latest(chain.iter().copied());
        self.command_sequence_number.advance(latest);
        if !latest.is_zero() {
            debug!("[KSQL_HTTP] coordinate request to run after command {}", latest);
        }
    }

    pub fn prerequisite(&self) -> SequenceToken {
        self.command_sequence_number
    }

    pub(crate) fn preview(&self) -> String {
        let text = self.ksql.replace('\n', " ");
        if text.len() > 80 {
            let mut end = 80;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &text[..end])
        } else {
            text
        }
    }
}

impl From<&str> for Statement {
    fn from(ksql: &str) -> Self {
        Statement::new(ksql)
    }
}

impl From<String> for Statement {
    fn from(ksql: String) -> Self {
        Statement::new(ksql)
    }
}
