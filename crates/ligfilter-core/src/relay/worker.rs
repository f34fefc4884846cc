use super::codec::{FrameReader, FrameWriter};
use super::error::RelayError;
use super::message::{OwnerMessage, QueryRequest, RequestId, WorkerMessage};
use crate::core::models::criteria::FilterCriteria;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

type PendingMap = HashMap<RequestId, oneshot::Sender<u64>>;

struct Inner {
    outbound: mpsc::UnboundedSender<WorkerMessage>,
    // `None` once the owner's side of the channel has closed.
    pending: Mutex<Option<PendingMap>>,
    next_id: AtomicU64,
    timeout: Option<Duration>,
}

impl Inner {
    fn forget(&self, id: RequestId) {
        if let Some(pending) = self.pending.lock().as_mut() {
            pending.remove(&id);
        }
    }
}

/// A worker's client for the owner.
///
/// Cheap to clone; every clone shares one channel and one table of in-flight requests, so
/// any number of external requests may be awaiting the owner at once. Each reply is routed
/// to the request that carries its id, whatever order the replies arrive in.
#[derive(Clone)]
pub struct RelayClient {
    inner: Arc<Inner>,
}

/// Background tasks driving a [`RelayClient`]'s channel.
pub struct RelayConnection {
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl RelayConnection {
    /// Resolves once the owner has closed its end of the channel.
    pub async fn closed(self) {
        let _ = self.reader.await;
        self.writer.abort();
    }
}

impl RelayClient {
    /// Starts relaying over `reader`/`writer`, which are normally the worker's stdin and stdout.
    pub fn connect<R, W>(
        reader: R,
        writer: W,
        timeout: Option<Duration>,
    ) -> (RelayClient, RelayConnection)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound, mut queue) = mpsc::unbounded_channel::<WorkerMessage>();
        let inner = Arc::new(Inner {
            outbound,
            pending: Mutex::new(Some(HashMap::new())),
            next_id: AtomicU64::new(0),
            timeout,
        });

        let writer = tokio::spawn(async move {
            let mut frames = FrameWriter::new(writer);
            while let Some(message) = queue.recv().await {
                if let Err(e) = frames.send(&message).await {
                    warn!("Failed to write to the owner: {}", e);
                    break;
                }
            }
        });

        let dispatch = Arc::clone(&inner);
        let reader = tokio::spawn(async move {
            let mut frames = FrameReader::new(BufReader::new(reader));
            loop {
                match frames.next::<OwnerMessage>().await {
                    Ok(Some(OwnerMessage::Ligands(response))) => {
                        let waiter = dispatch
                            .pending
                            .lock()
                            .as_mut()
                            .and_then(|pending| pending.remove(&response.id));
                        match waiter {
                            Some(waiter) => {
                                trace!("Reply {} carries {} ligands", response.id, response.ligands);
                                // The requester may have timed out in the meantime.
                                let _ = waiter.send(response.ligands);
                            }
                            None => warn!("Discarding reply for unknown request {}", response.id),
                        }
                    }
                    Ok(None) => {
                        debug!("Owner closed the relay channel");
                        break;
                    }
                    Err(RelayError::Malformed { source }) => {
                        warn!("Ignoring malformed message from the owner: {}", source);
                    }
                    Err(e) => {
                        warn!("Relay channel failed: {}", e);
                        break;
                    }
                }
            }
            // Dropping the senders wakes every outstanding request with a disconnect.
            dispatch.pending.lock().take();
        });

        (RelayClient { inner }, RelayConnection { reader, writer })
    }

    /// Tells the owner this worker is accepting requests.
    pub fn announce_ready(&self, slot: usize) -> Result<(), RelayError> {
        self.inner
            .outbound
            .send(WorkerMessage::Ready {
                slot,
                pid: std::process::id(),
            })
            .map_err(|_| RelayError::OwnerDisconnected)
    }

    /// Forwards `criteria` to the owner and waits for its count.
    ///
    /// # Errors
    ///
    /// [`RelayError::OwnerDisconnected`] when the channel closes before the reply arrives, and
    /// [`RelayError::Timeout`] when a request timeout is configured and elapses first.
    /// [`RelayError::NonFiniteCriteria`] when a bound has no JSON encoding.
    pub async fn count(&self, criteria: FilterCriteria) -> Result<u64, RelayError> {
        if !criteria.is_finite() {
            return Err(RelayError::NonFiniteCriteria);
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        match self.inner.pending.lock().as_mut() {
            Some(pending) => pending.insert(id, tx),
            None => return Err(RelayError::OwnerDisconnected),
        };

        let request = WorkerMessage::Query(QueryRequest { id, criteria });
        if self.inner.outbound.send(request).is_err() {
            self.inner.forget(id);
            return Err(RelayError::OwnerDisconnected);
        }

        let reply = match self.inner.timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(reply) => reply,
                Err(_) => {
                    self.inner.forget(id);
                    return Err(RelayError::Timeout(limit));
                }
            },
            None => rx.await,
        };
        reply.map_err(|_| RelayError::OwnerDisconnected)
    }

    /// Number of requests still waiting for the owner.
    pub fn in_flight(&self) -> usize {
        self.inner
            .pending
            .lock()
            .as_ref()
            .map_or(0, |pending| pending.len())
    }
}
