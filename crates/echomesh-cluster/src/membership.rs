use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::pool::RoutingPool;
use crate::worker::{WorkerHandle, WorkerId};

/// Mailbox depth for membership notifications.
pub(crate) const MEMBERSHIP_MAILBOX_CAPACITY: usize = 32;

/// Topology change notification from the membership provider.
#[derive(Debug)]
pub enum MembershipEvent {
    /// A worker became reachable and may receive dispatches.
    Joined(WorkerHandle),
    /// A worker left or became unreachable; it must stop receiving
    /// dispatches.
    Left(WorkerId),
}

/// Applies membership events to the routing pool.
///
/// One task owns all pool mutation; everything else only reads snapshots.
/// The task exits when the provider drops its sender.
pub fn spawn_membership_task(
    pool: Arc<RoutingPool>,
    mut events: mpsc::Receiver<MembershipEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                MembershipEvent::Joined(handle) => {
                    info!(worker = %handle.id(), "worker joined the pool");
                    pool.add(handle);
                }
                MembershipEvent::Left(id) => {
                    info!(worker = %id, "worker left the pool");
                    pool.remove(id);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::Worker;
    use std::time::Duration;

    async fn wait_for_len(pool: &RoutingPool, len: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while pool.len() != len {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("pool never reached {len} members"));
    }

    #[tokio::test]
    async fn test_join_and_leave_events_update_the_pool() {
        let pool = Arc::new(RoutingPool::new());
        let (tx, rx) = mpsc::channel(MEMBERSHIP_MAILBOX_CAPACITY);
        spawn_membership_task(Arc::clone(&pool), rx);

        let (handle, _worker) = Worker::channel(WorkerId(0));
        tx.send(MembershipEvent::Joined(handle)).await.unwrap();
        wait_for_len(&pool, 1).await;

        tx.send(MembershipEvent::Left(WorkerId(0))).await.unwrap();
        wait_for_len(&pool, 0).await;
    }

    #[tokio::test]
    async fn test_task_stops_when_the_provider_goes_away() {
        let pool = Arc::new(RoutingPool::new());
        let (tx, rx) = mpsc::channel(MEMBERSHIP_MAILBOX_CAPACITY);
        let task = spawn_membership_task(Arc::clone(&pool), rx);

        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("membership task should exit")
            .unwrap();
    }
}
