use std::sync::Arc;

use echomesh_common::{MeshError, Result};
use echomesh_metrics::MetricsRegistry;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::pool::RoutingPool;
use crate::reply::{reply_slot, PendingReply, ReplySlot};
use crate::worker::WorkerEnvelope;

const FORWARDER_MAILBOX_CAPACITY: usize = 256;

/// One forwarding order: a payload plus the originator's reply slot.
#[derive(Debug)]
pub struct ForwardCommand {
    pub payload: String,
    pub reply_to: ReplySlot,
}

/// Cloneable front door of the forwarding actor.
#[derive(Debug, Clone)]
pub struct ForwarderHandle {
    mailbox: mpsc::Sender<ForwardCommand>,
}

impl ForwarderHandle {
    /// Submits a payload for dispatch and returns the pending reply the
    /// caller races against its deadline.
    pub async fn submit(&self, payload: impl Into<String>) -> Result<PendingReply> {
        let (slot, pending) = reply_slot();
        let command = ForwardCommand {
            payload: payload.into(),
            reply_to: slot,
        };
        self.mailbox
            .send(command)
            .await
            .map_err(|_| MeshError::Routing("forwarder mailbox closed".to_string()))?;
        Ok(pending)
    }
}

/// The forwarding actor: a deliberately stupid relay between the boundary
/// and the routing pool.
///
/// For each command it selects one live worker and hands the envelope over
/// without ever waiting on anything downstream; the worker resolves the
/// originator's slot directly, so a slow worker stalls exactly one call and
/// never the forwarder. An empty pool or a failed hand-off resolves the slot
/// with the corresponding failure instead. There is no re-selection on
/// delivery failure; the outcome is reported and retry policy stays with the
/// caller.
pub struct Forwarder {
    pool: Arc<RoutingPool>,
    metrics: Arc<MetricsRegistry>,
    mailbox: mpsc::Receiver<ForwardCommand>,
}

impl Forwarder {
    /// Spawns the forwarding task and returns its handle.
    pub fn spawn(pool: Arc<RoutingPool>, metrics: Arc<MetricsRegistry>) -> ForwarderHandle {
        let (handle, forwarder) = Self::channel(pool, metrics);
        tokio::spawn(forwarder.run());
        handle
    }

    /// Builds the handle/actor pair without spawning the consumer task.
    pub fn channel(
        pool: Arc<RoutingPool>,
        metrics: Arc<MetricsRegistry>,
    ) -> (ForwarderHandle, Forwarder) {
        let (tx, rx) = mpsc::channel(FORWARDER_MAILBOX_CAPACITY);
        (
            ForwarderHandle { mailbox: tx },
            Forwarder {
                pool,
                metrics,
                mailbox: rx,
            },
        )
    }

    pub async fn run(mut self) {
        while let Some(command) = self.mailbox.recv().await {
            self.forward(command);
        }
        debug!("forwarder mailbox closed, stopping");
    }

    /// Routes one command. Never awaits.
    fn forward(&self, command: ForwardCommand) {
        let Some(target) = self.pool.select() else {
            debug!("dispatch with no reachable workers");
            command.reply_to.resolve(Err(MeshError::NoAvailableTarget));
            return;
        };

        let envelope = WorkerEnvelope {
            payload: command.payload,
            reply_to: command.reply_to,
        };

        match target.deliver(envelope) {
            Ok(()) => {
                self.metrics.record_worker_dispatch(&target.id().to_string());
            }
            Err(TrySendError::Closed(envelope)) => {
                warn!(worker = %target.id(), "selected worker is gone");
                envelope
                    .reply_to
                    .resolve(Err(MeshError::Routing(format!(
                        "{} is unreachable",
                        target.id()
                    ))));
            }
            Err(TrySendError::Full(envelope)) => {
                warn!(worker = %target.id(), "selected worker mailbox is full");
                envelope
                    .reply_to
                    .resolve(Err(MeshError::Routing(format!(
                        "{} mailbox is full",
                        target.id()
                    ))));
            }
        }
    }
}
