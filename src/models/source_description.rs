use serde::{Deserialize, Serialize};

use super::resource_kind::ResourceKind;

/// A running continuous query, as listed by `LIST QUERIES` or `DESCRIBE`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRef {
    pub id: String,

    #[serde(default)]
    pub query_string: String,

    /// Resources the query writes into
    #[serde(default)]
    pub sinks: Vec<String>,
}

/// Schema of one field of a stream or table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub name: String,
    pub schema: FieldType,
}

/// One of INTEGER, BIGINT, BOOLEAN, DOUBLE, STRING, MAP, ARRAY or STRUCT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldType {
    #[serde(rename = "type")]
    pub type_name: String,

    /// Value schema for MAP, element schema for ARRAY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_schema: Option<Box<FieldType>>,

    /// Members of a STRUCT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSchema>>,
}

/// Result of `DESCRIBE <name>`: a read snapshot of a stream or table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescription {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ResourceKind,

    /// Queries reading from the resource
    #[serde(default)]
    pub read_queries: Vec<QueryRef>,

    /// Queries writing into the resource
    #[serde(default)]
    pub write_queries: Vec<QueryRef>,

    #[serde(default)]
    pub fields: Vec<FieldSchema>,

    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub timestamp: String,

    #[serde(default)]
    pub format: String,

    #[serde(default)]
    pub topic: String,

    #[serde(default)]
    pub extended: bool,

    #[serde(default)]
    pub statistics: String,

    #[serde(default)]
    pub error_stats: String,

    #[serde(default)]
    pub replication: i32,

    #[serde(default)]
    pub partitions: i32,
}

/// Entry of `LIST STREAMS` / `LIST TABLES`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub name: String,

    #[serde(default)]
    pub topic: String,

    #[serde(default)]
    pub format: String,

    #[serde(default)]
    pub is_windowed: bool,
}
