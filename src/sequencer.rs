//! Drop sequencing.
//!
//! The server applies mutating commands asynchronously, so a `DROP` submitted
//! right after a `TERMINATE` can overtake it. Each terminate here carries the
//! sequence token of the previous command, and the drop carries the last one.
//!
//! Two runs against the same resource must not overlap; callers serialize them.

use async_trait::async_trait;
use log::{debug, info};
use std::collections::{BTreeSet, HashSet};

use crate::{
    error::{KsqlLinkError, Result},
    models::{CommandStatus, QueryRef, ResourceKind, SourceDescription, Statement},
    normalize::{canonical_name, quote_identifier},
    seq_token::SequenceToken,
    statements::{drop_query, terminate_query},
};

/// The control operations the sequencer needs from a server.
#[async_trait]
pub trait DdlExecutor: Send + Sync {
    /// `DESCRIBE <name>;`
    async fn describe(&self, name: &str) -> Result<SourceDescription>;

    /// Run a mutating statement and return its acknowledgement.
    async fn execute_command(&self, statement: Statement) -> Result<CommandStatus>;
}

/// What to do with queries that read from the resource being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReaderPolicy {
    /// Refuse to drop while any query reads from the resource
    #[default]
    Block,
    /// Terminate reading queries first, then writers
    TerminateReaders,
}

/// Result of a completed drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOutcome {
    /// Canonical name of the dropped resource
    pub resource: String,
    /// Terminated query ids, in termination order
    pub terminated: Vec<String>,
    /// Token returned by each terminate, in the same order
    pub tokens: Vec<SequenceToken>,
    /// Acknowledgement of the drop itself
    pub ack: CommandStatus,
}

/// Runs describe, terminate and drop for one resource.
pub struct DropSequencer<'a, E: ?Sized> {
    executor: &'a E,
    policy: ReaderPolicy,
}

impl<'a, E> DropSequencer<'a, E>
where
    E: DdlExecutor + ?Sized,
{
    pub fn new(executor: &'a E) -> Self {
        Self {
            executor,
            policy: ReaderPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReaderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Drop `name` after terminating the queries that depend on it.
    ///
    /// Dependency and sink checks run before any mutation. A failure after the
    /// first terminate is wrapped in [`KsqlLinkError::PartialDrop`]; already
    /// terminated queries are not restarted.
    pub async fn drop_resource(&self, kind: ResourceKind, name: &str) -> Result<DropOutcome> {
        let target = canonical_name(name);
        let description = self.executor.describe(name).await?;
        let plan = self.plan(&description, &target)?;

        if !plan.is_empty() {
            info!(
                "[KSQL_DROP] terminating {} queries before dropping {} {}",
                plan.len(),
                kind,
                target
            );
        }

        let mut token = SequenceToken::ZERO;
        let mut tokens = Vec::with_capacity(plan.len());
        let mut terminated = Vec::with_capacity(plan.len());

        for query in plan {
            let statement = Statement::new(terminate_query(&query.id)).after(token);
            debug!("[KSQL_DROP] TERMINATE {} after command {}", query.id, token);
            let status = match self.executor.execute_command(statement).await {
                Ok(status) => status,
                Err(e) => return Err(partial(terminated, e)),
            };
            token.advance(status.sequence);
            tokens.push(status.sequence);
            terminated.push(query.id.clone());
        }

        let drop_text = drop_query(kind, &quote_identifier(&target));
        let statement = Statement::new(drop_text).after(token);
        info!("[KSQL_DROP] DROP {} {} after command {}", kind, target, token);
        let ack = match self.executor.execute_command(statement).await {
            Ok(ack) => ack,
            Err(e) => return Err(partial(terminated, e)),
        };

        Ok(DropOutcome {
            resource: target,
            terminated,
            tokens,
            ack,
        })
    }

    /// Queries to terminate, in order. Fails without side effects when the
    /// resource cannot be dropped safely.
    fn plan<'d>(
        &self,
        description: &'d SourceDescription,
        target: &str,
    ) -> Result<Vec<&'d QueryRef>> {
        let mut plan = Vec::new();

        if let Some(reader) = description.read_queries.first() {
            match self.policy {
                ReaderPolicy::Block => {
                    return Err(KsqlLinkError::DependencyError {
                        resource: target.to_string(),
                        query_id: reader.id.clone(),
                    });
                }
                ReaderPolicy::TerminateReaders => {
                    plan.extend(description.read_queries.iter());
                }
            }
        }

        // Sinks come back from the server already in canonical spelling.
        let expected: BTreeSet<&str> = std::iter::once(target).collect();
        for writer in &description.write_queries {
            let sinks: BTreeSet<&str> = writer.sinks.iter().map(String::as_str).collect();
            if sinks != expected {
                return Err(KsqlLinkError::SinkMismatch {
                    query_id: writer.id.clone(),
                    expected: target.to_string(),
                    sinks: writer.sinks.clone(),
                });
            }
            plan.push(writer);
        }

        let mut seen: HashSet<String> = HashSet::new();
        plan.retain(|query| seen.insert(query.id.clone()));
        Ok(plan)
    }
}

fn partial(terminated: Vec<String>, error: KsqlLinkError) -> KsqlLinkError {
    if terminated.is_empty() {
        error
    } else {
        KsqlLinkError::PartialDrop {
            terminated,
            source: Box::new(error),
        }
    }
}
