use echomesh_common::{MeshError, Result};
use tokio::sync::oneshot;

/// Write side of one call's pending-reply slot.
///
/// The slot travels with the request: the forwarder hands it to the selected
/// worker, and whichever component terminates the call resolves it directly
/// to the originator. `resolve` consumes the slot, so at most one terminal
/// value can ever reach the caller.
#[derive(Debug)]
pub struct ReplySlot {
    tx: oneshot::Sender<Result<String>>,
}

impl ReplySlot {
    /// Delivers the terminal value for this call.
    ///
    /// If the originator already gave up (deadline elapsed, receiver
    /// dropped), the value is discarded: a lost race, not an error.
    pub fn resolve(self, result: Result<String>) {
        let _ = self.tx.send(result);
    }
}

/// Read side of the slot, awaited by the boundary under its deadline.
#[derive(Debug)]
pub struct PendingReply {
    rx: oneshot::Receiver<Result<String>>,
}

impl PendingReply {
    pub async fn wait(self) -> Result<String> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(MeshError::Routing(
                "reply slot dropped before resolution".to_string(),
            )),
        }
    }
}

pub fn reply_slot() -> (ReplySlot, PendingReply) {
    let (tx, rx) = oneshot::channel();
    (ReplySlot { tx }, PendingReply { rx })
}
