use serde::{Deserialize, Serialize};

/// Server version and cluster identifiers from `GET /info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,

    #[serde(default)]
    pub kafka_cluster_id: String,

    #[serde(default)]
    pub ksql_service_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InfoBody {
    #[serde(rename = "KsqlServerInfo")]
    pub server_info: ServerInfo,
}
