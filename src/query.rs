//! Query channel adapter: bridges the streaming decoder to a caller's channel.
//!
//! The unbounded variant forwards records into a `tokio::sync::mpsc` channel
//! until the stream ends, a fatal read error occurs, or the cancellation token
//! fires. The bounded variant collects the whole stream in memory and must only
//! be used for statements that are guaranteed to end (`LIMIT n`).

use log::{debug, warn};
use tokio::io::AsyncBufRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    decoder::RecordDecoder,
    error::{KsqlLinkError, Result},
    models::ServerRecord,
};

/// Forward every decoded record to `tx`, in wire order.
///
/// Both suspension points (waiting for the next line and waiting for the
/// channel to accept a record) race against `cancel`. Cancellation and a
/// closed receiver end the loop with `Ok(())`; a record that was not yet
/// accepted is dropped. Decode errors and transient read errors are logged
/// and skipped. A fatal read error is returned.
pub async fn forward_records<R>(
    decoder: &mut RecordDecoder<R>,
    tx: &mpsc::Sender<ServerRecord>,
    cancel: &CancellationToken,
    label: &str,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut delivered: u64 = 0;
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("[KSQL_QUERY] \"{}\" cancelled after {} records", label, delivered);
                return Ok(());
            }
            next = decoder.next_record() => next,
        };

        let record = match next {
            None => {
                debug!("[KSQL_QUERY] \"{}\" ended after {} records", label, delivered);
                return Ok(());
            }
            Some(Ok(record)) => record,
            Some(Err(e)) if e.is_transient() => {
                warn!("[KSQL_QUERY] error reading results from query \"{}\": {}", label, e);
                continue;
            }
            Some(Err(e)) => {
                warn!("[KSQL_QUERY] fatal error reading results from query \"{}\": {}", label, e);
                return Err(e);
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("[KSQL_QUERY] \"{}\" cancelled after {} records", label, delivered);
                return Ok(());
            }
            sent = tx.send(record) => {
                if sent.is_err() {
                    debug!("[KSQL_QUERY] \"{}\" receiver dropped after {} records", label, delivered);
                    return Ok(());
                }
                delivered += 1;
            }
        }
    }
}

/// Collect the whole stream. Stops at end of stream or after a final message.
///
/// Any decode or read error fails the call.
pub async fn collect_records<R>(decoder: &mut RecordDecoder<R>) -> Result<Vec<ServerRecord>>
where
    R: AsyncBufRead + Unpin,
{
    let mut records = Vec::new();
    while let Some(item) = decoder.next_record().await {
        let record = item?;
        let done = record.is_final();
        records.push(record);
        if done {
            break;
        }
    }
    Ok(records)
}

/// A streaming query running on its own task.
///
/// Records arrive on [`QueryHandle::recv`]. [`QueryHandle::cancel`] stops the
/// producer; [`QueryHandle::finish`] waits for its terminal result.
pub struct QueryHandle {
    records: mpsc::Receiver<ServerRecord>,
    cancel: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl QueryHandle {
    /// Spawn the forwarding loop over `reader` with a channel of `buffer` slots.
    pub fn spawn<R>(reader: R, buffer: usize, label: String) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, records) = mpsc::channel(buffer.max(1));
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let mut decoder = RecordDecoder::new(reader);
            forward_records(&mut decoder, &tx, &task_cancel, &label).await
        });
        Self {
            records,
            cancel,
            task,
        }
    }

    /// Next delivered record; `None` once the producer has stopped and the
    /// buffer is drained.
    pub async fn recv(&mut self) -> Option<ServerRecord> {
        self.records.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the producer to stop and return its result.
    pub async fn finish(self) -> Result<()> {
        drop(self.records);
        self.task
            .await
            .map_err(|e| KsqlLinkError::InternalError(format!("query task failed: {}", e)))?
    }
}
