use std::sync::Arc;

use echomesh_metrics::MetricsRegistry;
use tokio::sync::mpsc;
use tracing::info;

use crate::forwarder::{Forwarder, ForwarderHandle};
use crate::membership::{spawn_membership_task, MembershipEvent, MEMBERSHIP_MAILBOX_CAPACITY};
use crate::pool::RoutingPool;
use crate::worker::{Worker, WorkerId};

/// Running cluster wiring: a forwarder in front of a routing pool fed by
/// membership events.
pub struct ClusterHandle {
    forwarder: ForwarderHandle,
    membership: mpsc::Sender<MembershipEvent>,
    pool: Arc<RoutingPool>,
}

impl ClusterHandle {
    /// Starts `pool_size` local echo workers behind a forwarding actor.
    ///
    /// The initial membership is applied before this returns, so the cluster
    /// can serve dispatches immediately; later topology changes arrive
    /// through the [`ClusterHandle::membership`] sender.
    pub fn start(pool_size: usize, metrics: Arc<MetricsRegistry>) -> ClusterHandle {
        let pool = Arc::new(RoutingPool::new());
        for n in 0..pool_size {
            pool.add(Worker::spawn(WorkerId(n as u64)));
        }

        let (membership_tx, membership_rx) = mpsc::channel(MEMBERSHIP_MAILBOX_CAPACITY);
        spawn_membership_task(Arc::clone(&pool), membership_rx);

        let forwarder = Forwarder::spawn(Arc::clone(&pool), metrics);
        info!(pool_size, "cluster started");

        ClusterHandle {
            forwarder,
            membership: membership_tx,
            pool,
        }
    }

    pub fn forwarder(&self) -> ForwarderHandle {
        self.forwarder.clone()
    }

    /// Sender for topology changes; the membership provider's end of the
    /// event stream.
    pub fn membership(&self) -> mpsc::Sender<MembershipEvent> {
        self.membership.clone()
    }

    pub fn pool(&self) -> Arc<RoutingPool> {
        Arc::clone(&self.pool)
    }
}
