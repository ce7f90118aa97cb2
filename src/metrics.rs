/// Metrics Registry Module
///
/// Aggregate counters and derived rates, behind a single lock so that a
/// snapshot is internally consistent. A reporter task logs a human-readable
/// snapshot on an interval until shutdown.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::tracker::SlotTracker;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Counter(u64),
    Gauge(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Counter(v) => *v as f64,
            MetricValue::Gauge(v) => *v,
        }
    }
}

struct Inner {
    processed: u64,
    failed: u64,
    retried: u64,
    missed: u64,
    processing_time: Duration,
    last_processed_slot: u64,
    blocks_per_second: f64,
    start: Instant,
}

pub struct Metrics {
    inner: Mutex<Inner>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                processed: 0,
                failed: 0,
                retried: 0,
                missed: 0,
                processing_time: Duration::ZERO,
                last_processed_slot: 0,
                blocks_per_second: 0.0,
                start: Instant::now(),
            }),
        }
    }

    pub fn update(&self, slot: u64, processing_time: Duration, was_retry: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.processed += 1;
        inner.processing_time += processing_time;
        inner.last_processed_slot = slot;
        if was_retry {
            inner.retried += 1;
        }

        let elapsed = inner.start.elapsed().as_secs_f64();
        inner.blocks_per_second = if elapsed > 0.0 { inner.processed as f64 / elapsed } else { 0.0 };
    }

    pub fn record_failure(&self) {
        self.inner.lock().unwrap().failed += 1;
    }

    pub fn record_missed(&self) {
        self.inner.lock().unwrap().missed += 1;
    }

    /// Point-in-time snapshot, augmented with externally supplied tracker
    /// gauges (`empty_slots`, `pending_slots`).
    pub fn snapshot(&self, empty_slots: usize, pending_slots: usize) -> BTreeMap<String, MetricValue> {
        let inner = self.inner.lock().unwrap();

        let avg_processing_time_ms = if inner.processed > 0 {
            inner.processing_time.as_millis() as f64 / inner.processed as f64
        } else {
            0.0
        };

        let success_rate = if inner.processed > 0 {
            (inner.processed.saturating_sub(inner.failed)) as f64 / inner.processed as f64 * 100.0
        } else {
            0.0
        };

        let mut snapshot = BTreeMap::new();
        snapshot.insert("processed".to_string(), MetricValue::Counter(inner.processed));
        snapshot.insert("failed".to_string(), MetricValue::Counter(inner.failed));
        snapshot.insert("retried".to_string(), MetricValue::Counter(inner.retried));
        snapshot.insert("missed".to_string(), MetricValue::Counter(inner.missed));
        snapshot.insert("blocks_per_second".to_string(), MetricValue::Gauge(inner.blocks_per_second));
        snapshot.insert("avg_processing_time_ms".to_string(), MetricValue::Gauge(avg_processing_time_ms));
        snapshot.insert("success_rate".to_string(), MetricValue::Gauge(success_rate));
        snapshot.insert("last_processed_slot".to_string(), MetricValue::Counter(inner.last_processed_slot));
        snapshot.insert("empty_slots".to_string(), MetricValue::Gauge(empty_slots as f64));
        snapshot.insert("pending_slots".to_string(), MetricValue::Gauge(pending_slots as f64));
        snapshot
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn format_snapshot(snapshot: &BTreeMap<String, MetricValue>) -> String {
    let mut out = String::from("\n=== Block Processing Metrics ===\n");
    for (key, value) in snapshot {
        match value {
            MetricValue::Counter(v) => out.push_str(&format!("{key}: {v}\n")),
            MetricValue::Gauge(v) => out.push_str(&format!("{key}: {v:.2}\n")),
        }
    }
    out.push_str("=================================");
    out
}

/// Spawn the periodic metrics reporter task. Exits when `shutdown` fires.
pub fn spawn_reporter(
    metrics: Arc<Metrics>,
    tracker: Arc<SlotTracker>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let snapshot = metrics.snapshot(tracker.len_empty(), tracker.len_pending());
                    tracing::info!("{}", format_snapshot(&snapshot));
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_metrics_derive_zero_not_divide_by_zero() {
        let metrics = Metrics::new();
        let snap = metrics.snapshot(0, 0);
        assert_eq!(snap["avg_processing_time_ms"].as_f64(), 0.0);
        assert_eq!(snap["success_rate"].as_f64(), 0.0);
    }

    #[test]
    fn update_tracks_processed_and_retried() {
        let metrics = Metrics::new();
        metrics.update(10, Duration::from_millis(100), false);
        metrics.update(11, Duration::from_millis(200), true);

        let snap = metrics.snapshot(0, 0);
        assert_eq!(snap["processed"].as_f64(), 2.0);
        assert_eq!(snap["retried"].as_f64(), 1.0);
        assert_eq!(snap["last_processed_slot"].as_f64(), 11.0);
    }

    #[test]
    fn success_rate_identity() {
        let metrics = Metrics::new();
        metrics.update(1, Duration::from_millis(1), false);
        metrics.update(2, Duration::from_millis(1), false);
        metrics.record_failure();

        let snap = metrics.snapshot(0, 0);
        // processed=2, failed=1 => (2-1)/2*100 = 50
        assert_eq!(snap["success_rate"].as_f64(), 50.0);
    }

    #[test]
    fn gauges_reflect_supplied_tracker_sizes() {
        let metrics = Metrics::new();
        let snap = metrics.snapshot(3, 7);
        assert_eq!(snap["empty_slots"].as_f64(), 3.0);
        assert_eq!(snap["pending_slots"].as_f64(), 7.0);
    }
}
