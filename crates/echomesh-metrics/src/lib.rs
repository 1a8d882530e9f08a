//! # echomesh Metrics
//!
//! In-process metrics for the dispatch path: outcome counters, a lock-free
//! latency histogram, and per-worker dispatch tallies. A point-in-time
//! [`MetricsSnapshot`] is serializable and served by the HTTP boundary.
//!
//! The hot path (recording one dispatch) is atomic increments only; locks
//! are taken briefly when a previously unseen worker id appears.

pub mod registry;
pub mod snapshot;

pub use registry::MetricsRegistry;
pub use snapshot::{LatencySummary, MetricsSnapshot, WorkerMetrics};
