use super::codec::{FrameReader, FrameWriter};
use super::error::RelayError;
use super::message::{OwnerMessage, QueryRequest, QueryResponse, WorkerMessage};
use crate::core::models::criteria::FilterCriteria;
use crate::engine::store::LigandStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

type ReplySender = mpsc::UnboundedSender<QueryResponse>;

struct Envelope {
    request: QueryRequest,
    reply: ReplySender,
}

/// Cloneable entry point to the owner's scan thread.
///
/// All handles feed one inbox, so queries from every worker are scanned strictly one after
/// another in the order they were delivered.
#[derive(Clone)]
pub struct OwnerHandle {
    inbox: mpsc::UnboundedSender<Envelope>,
    next_local_id: Arc<AtomicU64>,
}

/// Join handle for the thread that owns the [`LigandStore`].
pub struct OwnerThread {
    handle: thread::JoinHandle<u64>,
}

impl OwnerThread {
    /// Waits for the scan thread to exit, which happens once every [`OwnerHandle`] is gone.
    /// Returns the number of queries served.
    pub fn join(self) -> Result<u64, RelayError> {
        self.handle.join().map_err(|_| RelayError::OwnerStopped)
    }
}

pub struct Owner;

impl Owner {
    /// Moves `store` onto a dedicated scan thread and returns the handle used to query it.
    pub fn spawn(store: LigandStore) -> Result<(OwnerHandle, OwnerThread), RelayError> {
        let (inbox, receiver) = mpsc::unbounded_channel();
        info!("Ligand store with {} records is now queryable", store.len());
        let handle = thread::Builder::new()
            .name("ligand-owner".to_string())
            .spawn(move || serve(store, receiver))?;
        Ok((
            OwnerHandle {
                inbox,
                next_local_id: Arc::new(AtomicU64::new(0)),
            },
            OwnerThread { handle },
        ))
    }
}

fn serve(store: LigandStore, mut inbox: mpsc::UnboundedReceiver<Envelope>) -> u64 {
    let mut served = 0u64;
    while let Some(Envelope { request, reply }) = inbox.blocking_recv() {
        let start = Instant::now();
        let ligands = store.scan(&request.criteria);
        debug!(
            "Query {} matched {} ligands in {} ms",
            request.id,
            ligands,
            start.elapsed().as_millis()
        );
        if reply
            .send(QueryResponse {
                id: request.id,
                ligands,
            })
            .is_err()
        {
            warn!(
                "Channel for query {} closed before its reply could be delivered",
                request.id
            );
        }
        served += 1;
    }
    debug!("Owner inbox closed after {} queries", served);
    served
}

impl OwnerHandle {
    /// Queues `request`; the response is sent on `reply` once its scan completes.
    fn submit(&self, request: QueryRequest, reply: ReplySender) -> Result<(), RelayError> {
        self.inbox
            .send(Envelope { request, reply })
            .map_err(|_| RelayError::OwnerStopped)
    }

    /// Scans on behalf of an in-process caller.
    pub async fn count(&self, criteria: FilterCriteria) -> Result<u64, RelayError> {
        let (reply, mut response) = mpsc::unbounded_channel();
        let id = self.next_local_id.fetch_add(1, Ordering::Relaxed);
        self.submit(QueryRequest { id, criteria }, reply)?;
        response
            .recv()
            .await
            .map(|r| r.ligands)
            .ok_or(RelayError::OwnerStopped)
    }
}

/// The owner's end of one worker channel.
pub struct WorkerChannel {
    slot: usize,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl WorkerChannel {
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Stops relaying for this channel. Replies still queued for it are discarded.
    pub fn abort(&self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Binds a worker's pipes to the owner.
///
/// Queries read from `reader` are forwarded to the scan thread together with this channel's
/// reply sender; responses are written to `writer` as they complete.
pub fn attach<R, W>(slot: usize, reader: R, writer: W, owner: OwnerHandle) -> WorkerChannel
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (reply, mut replies) = mpsc::unbounded_channel::<QueryResponse>();

    let writer = tokio::spawn(async move {
        let mut frames = FrameWriter::new(writer);
        while let Some(response) = replies.recv().await {
            trace!("Replying to worker {} query {}", slot, response.id);
            if let Err(e) = frames.send(&OwnerMessage::Ligands(response)).await {
                warn!("Failed to reply to worker {}: {}", slot, e);
                break;
            }
        }
    });

    let reader = tokio::spawn(async move {
        let mut frames = FrameReader::new(BufReader::new(reader));
        loop {
            match frames.next::<WorkerMessage>().await {
                Ok(Some(WorkerMessage::Ready { slot: announced, pid })) => {
                    info!("Worker {} (pid {}) is accepting requests", announced, pid);
                }
                Ok(Some(WorkerMessage::Query(request))) => {
                    trace!("Worker {} sent query {}", slot, request.id);
                    if let Err(e) = owner.submit(request, reply.clone()) {
                        warn!("Dropping query from worker {}: {}", slot, e);
                        break;
                    }
                }
                Ok(None) => {
                    debug!("Worker {} closed its channel", slot);
                    break;
                }
                Err(RelayError::Malformed { source }) => {
                    warn!("Ignoring malformed message from worker {}: {}", slot, source);
                }
                Err(e) => {
                    warn!("Lost channel to worker {}: {}", slot, e);
                    break;
                }
            }
        }
    });

    WorkerChannel {
        slot,
        reader,
        writer,
    }
}
