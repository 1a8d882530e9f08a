//! # echomesh Cluster
//!
//! The dispatch core: worker actors, the routing pool over a dynamic
//! membership set, and the forwarding actor that relays each inbound request
//! to exactly one worker.
//!
//! Every stateful component here is a single sequential consumer of its own
//! mailbox; the only state shared across tasks is the pool's membership
//! snapshot, which is swapped atomically on every change.

pub mod cluster;
pub mod forwarder;
pub mod membership;
pub mod pool;
pub mod reply;
pub mod worker;

pub use cluster::ClusterHandle;
pub use forwarder::{Forwarder, ForwarderHandle};
pub use membership::MembershipEvent;
pub use pool::RoutingPool;
pub use reply::{reply_slot, PendingReply, ReplySlot};
pub use worker::{Worker, WorkerHandle, WorkerId};
