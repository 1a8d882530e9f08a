use std::fmt;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use crate::reply::ReplySlot;

/// Mailbox depth of one worker. Dispatches beyond this are delivery failures,
/// not queued indefinitely.
const WORKER_MAILBOX_CAPACITY: usize = 64;

/// Opaque identifier of one worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// One unit of work handed to a worker: the payload plus the originator's
/// reply slot. The worker resolves the slot directly; the reply never travels
/// back through the forwarder.
#[derive(Debug)]
pub struct WorkerEnvelope {
    pub payload: String,
    pub reply_to: ReplySlot,
}

/// Cloneable address of a running worker.
///
/// Owned by the routing pool; compared and hashed by id only, so a re-joined
/// worker with the same id replaces rather than duplicates.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    id: WorkerId,
    mailbox: mpsc::Sender<WorkerEnvelope>,
}

impl WorkerHandle {
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Hands an envelope to the worker without waiting for mailbox space.
    pub fn deliver(
        &self,
        envelope: WorkerEnvelope,
    ) -> Result<(), TrySendError<WorkerEnvelope>> {
        self.mailbox.try_send(envelope)
    }
}

impl PartialEq for WorkerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WorkerHandle {}

impl std::hash::Hash for WorkerHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A stateless echo worker processing its mailbox sequentially.
///
/// One dedicated task per instance; no two envelopes are ever handled
/// concurrently by the same worker, and no worker state leaks outside the
/// consumer loop.
pub struct Worker {
    id: WorkerId,
    mailbox: mpsc::Receiver<WorkerEnvelope>,
}

impl Worker {
    /// Spawns a worker task and returns its handle. The task exits once every
    /// clone of the handle has been dropped.
    pub fn spawn(id: WorkerId) -> WorkerHandle {
        let (handle, worker) = Self::channel(id);
        tokio::spawn(worker.run());
        handle
    }

    /// Builds the handle/worker pair without spawning the consumer task.
    ///
    /// Test seam: a `Worker` that is never run accepts deliveries but leaves
    /// them unanswered, and dropping it closes the mailbox.
    pub fn channel(id: WorkerId) -> (WorkerHandle, Worker) {
        let (tx, rx) = mpsc::channel(WORKER_MAILBOX_CAPACITY);
        (
            WorkerHandle { id, mailbox: tx },
            Worker { id, mailbox: rx },
        )
    }

    pub async fn run(mut self) {
        while let Some(envelope) = self.mailbox.recv().await {
            debug!(worker = %self.id, payload = %envelope.payload, "handling request");
            let reply = Self::handle(&envelope.payload);
            envelope.reply_to.resolve(Ok(reply));
        }
        debug!(worker = %self.id, "mailbox closed, stopping");
    }

    /// The fixed reply transformation.
    ///
    /// Deterministic and payload-preserving so callers can assert which
    /// request a reply belongs to.
    fn handle(payload: &str) -> String {
        format!("hi! {payload}")
    }
}
