use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a named resource on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceKind {
    Stream,
    Table,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Stream => write!(f, "STREAM"),
            ResourceKind::Table => write!(f, "TABLE"),
        }
    }
}
