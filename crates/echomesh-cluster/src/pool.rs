use arc_swap::ArcSwap;
use rand::seq::SliceRandom;

use crate::worker::{WorkerHandle, WorkerId};

/// Routing pool over the live membership set.
///
/// The set is a copy-on-write snapshot: every membership change builds a new
/// vector and swaps it in atomically, so concurrent `select` calls always see
/// a complete set, never a half-applied update. Selection is uniform random
/// and stateless across calls, which keeps concurrent dispatches independent
/// of each other.
#[derive(Debug)]
pub struct RoutingPool {
    members: ArcSwap<Vec<WorkerHandle>>,
}

impl RoutingPool {
    pub fn new() -> Self {
        Self {
            members: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Picks one live worker uniformly at random.
    ///
    /// Returns `None` when the pool is empty; surfacing that is the caller's
    /// job, the pool never waits or retries.
    pub fn select(&self) -> Option<WorkerHandle> {
        let members = self.members.load();
        members.choose(&mut rand::thread_rng()).cloned()
    }

    /// Adds a member. An id already present is ignored.
    pub fn add(&self, handle: WorkerHandle) {
        self.members.rcu(|members| {
            let mut next = (**members).clone();
            if !next.iter().any(|m| m.id() == handle.id()) {
                next.push(handle.clone());
            }
            next
        });
    }

    /// Removes the member with the given id. Unknown ids are a no-op.
    pub fn remove(&self, id: WorkerId) {
        self.members.rcu(|members| {
            let mut next = (**members).clone();
            next.retain(|m| m.id() != id);
            next
        });
    }

    pub fn len(&self) -> usize {
        self.members.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.load().is_empty()
    }

    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.members.load().iter().map(|m| m.id()).collect()
    }
}

impl Default for RoutingPool {
    fn default() -> Self {
        Self::new()
    }
}
