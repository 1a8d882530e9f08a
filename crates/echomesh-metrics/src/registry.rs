use crate::snapshot::{LatencySummary, MetricsSnapshot, WorkerMetrics};
use echomesh_common::DispatchOutcome;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock as StdRwLock};
use std::time::Instant;

/// One bin per power of two of microseconds, 1us up past an hour.
const NUM_BINS: usize = 64;

/// Lock-free power-of-two latency histogram.
///
/// Recording is a couple of relaxed atomic increments; percentile estimation
/// is a linear scan over the 64 bins with linear interpolation inside the
/// winning bin. Accuracy is bounded by the bin width, which is plenty for a
/// dashboard-grade summary.
#[derive(Debug)]
struct LatencyHistogram {
    bins: [AtomicU64; NUM_BINS],
    total_latency: AtomicU64,
    sample_count: AtomicU64,
}

impl LatencyHistogram {
    fn new() -> Self {
        Self {
            bins: std::array::from_fn(|_| AtomicU64::new(0)),
            total_latency: AtomicU64::new(0),
            sample_count: AtomicU64::new(0),
        }
    }

    fn record(&self, latency_us: u64) {
        let bin = Self::latency_to_bin(latency_us);
        self.bins[bin].fetch_add(1, Ordering::Relaxed);
        self.total_latency.fetch_add(latency_us, Ordering::Relaxed);
        self.sample_count.fetch_add(1, Ordering::Relaxed);
    }

    fn latency_to_bin(latency_us: u64) -> usize {
        if latency_us == 0 {
            return 0;
        }
        (latency_us.ilog2() as usize).min(NUM_BINS - 1)
    }

    /// Lower bound of a bin's value range.
    fn bin_floor(bin: usize) -> u64 {
        1u64 << bin
    }

    fn estimate_percentile(&self, percentile: u64) -> u64 {
        let total = self.sample_count.load(Ordering::Relaxed);
        if total == 0 {
            return 0;
        }

        let target_count = (total * percentile) / 100;
        let mut cumulative = 0;

        for (idx, bin) in self.bins.iter().enumerate() {
            let bin_count = bin.load(Ordering::Relaxed);
            if cumulative + bin_count >= target_count {
                if bin_count == 0 {
                    return Self::bin_floor(idx);
                }
                // Interpolate within the bin
                let floor = Self::bin_floor(idx);
                let ceil = floor.saturating_mul(2);
                let offset = target_count - cumulative;
                let fraction = offset as f64 / bin_count as f64;
                return floor + (fraction * (ceil - floor) as f64) as u64;
            }
            cumulative += bin_count;
        }

        Self::bin_floor(NUM_BINS - 1)
    }

    fn summary(&self) -> LatencySummary {
        let count = self.sample_count.load(Ordering::Relaxed);
        if count == 0 {
            return LatencySummary {
                avg_us: 0,
                p50_us: 0,
                p95_us: 0,
                p99_us: 0,
            };
        }

        LatencySummary {
            avg_us: self.total_latency.load(Ordering::Relaxed) / count,
            p50_us: self.estimate_percentile(50),
            p95_us: self.estimate_percentile(95),
            p99_us: self.estimate_percentile(99),
        }
    }
}

/// Central metrics store for one serving process.
///
/// Global outcome counters and the latency histogram are lock-free; the
/// per-worker tally map takes a write lock only when a previously unseen
/// worker id shows up, which happens at most once per pool member.
#[derive(Debug)]
pub struct MetricsRegistry {
    total_requests: AtomicU64,
    successes: AtomicU64,
    timeouts: AtomicU64,
    no_available_target: AtomicU64,
    routing_failures: AtomicU64,
    latency: LatencyHistogram,
    workers: StdRwLock<HashMap<String, Arc<AtomicU64>>>,
    start_time: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            no_available_target: AtomicU64::new(0),
            routing_failures: AtomicU64::new(0),
            latency: LatencyHistogram::new(),
            workers: StdRwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records the terminal outcome of one dispatched call together with its
    /// round-trip latency.
    pub fn record_dispatch(&self, outcome: &DispatchOutcome, started: Instant) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            DispatchOutcome::Success { .. } => &self.successes,
            DispatchOutcome::Timeout => &self.timeouts,
            DispatchOutcome::NoAvailableTarget => &self.no_available_target,
            DispatchOutcome::RoutingFailure { .. } => &self.routing_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.latency.record(started.elapsed().as_micros() as u64);
    }

    /// Tallies one request handed to the given worker.
    pub fn record_worker_dispatch(&self, worker: &str) {
        let counter = {
            let workers = self.workers.read().unwrap();
            workers.get(worker).cloned()
        };

        let counter = match counter {
            Some(counter) => counter,
            None => {
                let mut workers = self.workers.write().unwrap();
                Arc::clone(
                    workers
                        .entry(worker.to_string())
                        .or_insert_with(|| Arc::new(AtomicU64::new(0))),
                )
            }
        };

        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Takes a best-effort point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let workers = {
            let workers_guard = self.workers.read().unwrap();
            workers_guard
                .iter()
                .map(|(name, count)| {
                    (
                        name.clone(),
                        WorkerMetrics {
                            worker: name.clone(),
                            dispatch_count: count.load(Ordering::Relaxed),
                        },
                    )
                })
                .collect()
        };

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            no_available_target: self.no_available_target.load(Ordering::Relaxed),
            routing_failures: self.routing_failures.load(Ordering::Relaxed),
            uptime_ms: self.uptime_ms(),
            latency: self.latency.summary(),
            workers,
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
