use serde::{Deserialize, Serialize};
use std::fmt;

use crate::seq_token::SequenceToken;

/// Lifecycle state of a command in the server's command log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandState {
    #[serde(rename = "QUEUED", alias = "PARSING")]
    Queued,
    #[serde(rename = "EXECUTING")]
    Executing,
    #[serde(rename = "SUCCESS")]
    Succeeded,
    #[serde(rename = "ERROR")]
    Error,
    #[serde(rename = "TERMINATED")]
    Terminated,
}

impl CommandState {
    /// Whether the command has left the queue for good
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            CommandState::Succeeded | CommandState::Error | CommandState::Terminated
        )
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CommandState::Queued => "QUEUED",
            CommandState::Executing => "EXECUTING",
            CommandState::Succeeded => "SUCCESS",
            CommandState::Error => "ERROR",
            CommandState::Terminated => "TERMINATED",
        };
        write!(f, "{}", text)
    }
}

/// Acknowledgement of a mutating statement (`currentStatus` entity), or the
/// answer of the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CurrentStatusWire", into = "CurrentStatusWire")]
pub struct CommandStatus {
    pub command_id: String,
    pub state: CommandState,
    pub message: String,
    /// Position of the command in the command log; zero when not issued
    pub sequence: SequenceToken,
    pub statement_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentStatusWire {
    #[serde(default)]
    statement_text: String,
    #[serde(default)]
    command_id: String,
    command_status: StatusBody,
    #[serde(default)]
    command_sequence_number: SequenceToken,
}

/// Body of `GET /status`, also nested in `currentStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: CommandState,
    #[serde(default)]
    pub message: String,
}

impl From<CurrentStatusWire> for CommandStatus {
    fn from(wire: CurrentStatusWire) -> Self {
        Self {
            command_id: wire.command_id,
            state: wire.command_status.status,
            message: wire.command_status.message,
            sequence: wire.command_sequence_number,
            statement_text: wire.statement_text,
        }
    }
}

impl From<CommandStatus> for CurrentStatusWire {
    fn from(status: CommandStatus) -> Self {
        Self {
            statement_text: status.statement_text,
            command_id: status.command_id,
            command_status: StatusBody {
                status: status.state,
                message: status.message,
            },
            command_sequence_number: status.sequence,
        }
    }
}

impl CommandStatus {
    pub(crate) fn from_status_body(command_id: &str, body: StatusBody) -> Self {
        Self {
            command_id: command_id.to_string(),
            state: body.status,
            message: body.message,
            sequence: SequenceToken::ZERO,
            statement_text: String::new(),
        }
    }
}
