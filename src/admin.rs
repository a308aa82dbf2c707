//! Broker administration seam.
//!
//! Topic lifecycle lives outside the query server. Callers that need to
//! create or remove backing topics plug an implementation of [`TopicAdmin`]
//! in next to the client; [`MemoryTopicAdmin`] serves tests and local tools.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use crate::error::{KsqlLinkError, Result};

/// A broker topic and its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i16,

    /// Config entries; `None` means the broker default applies
    #[serde(default)]
    pub config: BTreeMap<String, Option<String>>,
}

impl Topic {
    pub fn new(name: impl Into<String>, partitions: i32, replication_factor: i16) -> Self {
        Self {
            name: name.into(),
            partitions,
            replication_factor,
            config: BTreeMap::new(),
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

/// Create, delete and read broker topics.
#[async_trait]
pub trait TopicAdmin: Send + Sync {
    async fn create_topic(&self, topic: &Topic) -> Result<()>;

    async fn delete_topic(&self, name: &str) -> Result<()>;

    async fn read_topic(&self, name: &str) -> Result<Topic>;
}

/// In-process [`TopicAdmin`] keyed by topic name.
#[derive(Default)]
pub struct MemoryTopicAdmin {
    topics: Mutex<HashMap<String, Topic>>,
}

impl MemoryTopicAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn topic_names(&self) -> Vec<String> {
        let topics = self.topics.lock().await;
        let mut names: Vec<String> = topics.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl TopicAdmin for MemoryTopicAdmin {
    async fn create_topic(&self, topic: &Topic) -> Result<()> {
        if topic.partitions <= 0 || topic.replication_factor <= 0 {
            return Err(KsqlLinkError::AdminError(format!(
                "topic {} needs positive partitions and replication factor",
                topic.name
            )));
        }
        let mut topics = self.topics.lock().await;
        if topics.contains_key(&topic.name) {
            return Err(KsqlLinkError::AdminError(format!(
                "topic {} already exists",
                topic.name
            )));
        }
        debug!(
            "[KSQL_ADMIN] created topic {} ({} partitions)",
            topic.name, topic.partitions
        );
        topics.insert(topic.name.clone(), topic.clone());
        Ok(())
    }

    async fn delete_topic(&self, name: &str) -> Result<()> {
        let mut topics = self.topics.lock().await;
        match topics.remove(name) {
            Some(_) => {
                debug!("[KSQL_ADMIN] deleted topic {}", name);
                Ok(())
            }
            None => Err(KsqlLinkError::AdminError(format!(
                "topic {} does not exist",
                name
            ))),
        }
    }

    async fn read_topic(&self, name: &str) -> Result<Topic> {
        let topics = self.topics.lock().await;
        topics
            .get(name)
            .cloned()
            .ok_or_else(|| KsqlLinkError::AdminError(format!("topic {} does not exist", name)))
    }
}
