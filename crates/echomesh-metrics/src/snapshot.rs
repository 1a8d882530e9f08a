use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dispatch tally for one worker, as seen from the forwarder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerMetrics {
    pub worker: String,
    pub dispatch_count: u64,
}

/// Round-trip latency summary in microseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencySummary {
    pub avg_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

/// Complete point-in-time metrics snapshot.
///
/// The snapshot is immutable and safe to serialize or ship elsewhere; the
/// counters it was copied from keep moving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successes: u64,
    pub timeouts: u64,
    pub no_available_target: u64,
    pub routing_failures: u64,
    pub uptime_ms: u64,
    pub latency: LatencySummary,
    pub workers: HashMap<String, WorkerMetrics>,
}
