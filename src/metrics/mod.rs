// Metrics module - in-process counters for compositions and upstream calls
// Thread-safe via atomic operations and mutexes; read back with snapshot()

use crate::compose::{ComposeReport, ComposeStep};
use crate::constants::MAX_DURATION_SAMPLES;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Histogram represents percentile statistics for latency measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Histogram {
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl Histogram {
    fn empty() -> Self {
        Histogram {
            p50: 0.0,
            p90: 0.0,
            p95: 0.0,
            p99: 0.0,
        }
    }
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub compositions: u64,
    pub decode_failures: u64,
    pub encode_failures: u64,
    /// Keyed by "step:outcome", e.g. "banner:skipped"
    pub step_outcomes: BTreeMap<String, u64>,
    pub upstream_requests: u64,
    pub upstream_statuses: BTreeMap<u16, u64>,
    pub images_rewritten: u64,
    /// Composition latency in milliseconds
    pub compose_latency: Histogram,
}

/// Metrics struct tracks composition and upstream counters
pub struct Metrics {
    // Composition counters
    compositions: AtomicU64,
    decode_failures: AtomicU64,
    encode_failures: AtomicU64,

    // Step outcome counters keyed by "step:outcome"
    step_outcomes: Mutex<HashMap<String, u64>>,

    // Upstream call counters
    upstream_requests: AtomicU64,
    upstream_statuses: Mutex<HashMap<u16, u64>>,
    images_rewritten: AtomicU64,

    // Most recent composition durations (stored in microseconds as u64)
    compose_durations: Mutex<VecDeque<u64>>,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Metrics {
            compositions: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            encode_failures: AtomicU64::new(0),
            step_outcomes: Mutex::new(HashMap::new()),
            upstream_requests: AtomicU64::new(0),
            upstream_statuses: Mutex::new(HashMap::new()),
            images_rewritten: AtomicU64::new(0),
            compose_durations: Mutex::new(VecDeque::with_capacity(MAX_DURATION_SAMPLES)),
        }
    }

    /// Record the outcome of one composition
    pub fn record_composition(&self, report: &ComposeReport) {
        self.compositions.fetch_add(1, Ordering::Relaxed);

        if report.decode.is_some() {
            self.decode_failures.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if report.encode.is_some() {
            self.encode_failures.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut counts) = self.step_outcomes.lock() {
            for step in ComposeStep::ALL {
                let outcome = report.step(step);
                let key = format!("{}:{}", step.as_str(), outcome.label());
                *counts.entry(key).or_insert(0) += 1;
            }
        }
    }

    /// Record a composition duration in milliseconds
    ///
    /// Only the last `MAX_DURATION_SAMPLES` durations are kept.
    pub fn record_compose_duration(&self, duration_ms: f64) {
        let duration_us = (duration_ms * 1000.0) as u64;
        if let Ok(mut durations) = self.compose_durations.lock() {
            if durations.len() == MAX_DURATION_SAMPLES {
                durations.pop_front();
            }
            durations.push_back(duration_us);
        }
    }

    /// Record the status returned for one forwarded request
    pub fn record_upstream(&self, status: u16) {
        self.upstream_requests.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut counts) = self.upstream_statuses.lock() {
            *counts.entry(status).or_insert(0) += 1;
        }
    }

    pub fn increment_images_rewritten(&self) {
        self.images_rewritten.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_composition_count(&self) -> u64 {
        self.compositions.load(Ordering::Relaxed)
    }

    pub fn get_step_count(&self, step: ComposeStep, outcome: &str) -> u64 {
        let key = format!("{}:{}", step.as_str(), outcome);
        self.step_outcomes
            .lock()
            .ok()
            .and_then(|counts| counts.get(&key).copied())
            .unwrap_or(0)
    }

    pub fn get_upstream_status_count(&self, status: u16) -> u64 {
        self.upstream_statuses
            .lock()
            .ok()
            .and_then(|counts| counts.get(&status).copied())
            .unwrap_or(0)
    }

    /// Calculate histogram from composition duration samples
    pub fn get_compose_histogram(&self) -> Histogram {
        if let Ok(mut durations) = self.compose_durations.lock() {
            calculate_histogram(durations.make_contiguous())
        } else {
            Histogram::empty()
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            compositions: self.compositions.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            encode_failures: self.encode_failures.load(Ordering::Relaxed),
            step_outcomes: self
                .step_outcomes
                .lock()
                .map(|counts| counts.iter().map(|(k, v)| (k.clone(), *v)).collect())
                .unwrap_or_default(),
            upstream_requests: self.upstream_requests.load(Ordering::Relaxed),
            upstream_statuses: self
                .upstream_statuses
                .lock()
                .map(|counts| counts.iter().map(|(k, v)| (*k, *v)).collect())
                .unwrap_or_default(),
            images_rewritten: self.images_rewritten.load(Ordering::Relaxed),
            compose_latency: self.get_compose_histogram(),
        }
    }
}

fn calculate_histogram(samples: &[u64]) -> Histogram {
    if samples.is_empty() {
        return Histogram::empty();
    }

    let mut sorted: Vec<u64> = samples.to_vec();
    sorted.sort_unstable();

    let p50_idx = (sorted.len() as f64 * 0.50) as usize;
    let p90_idx = (sorted.len() as f64 * 0.90) as usize;
    let p95_idx = (sorted.len() as f64 * 0.95) as usize;
    let p99_idx = (sorted.len() as f64 * 0.99) as usize;

    // Convert from microseconds to milliseconds
    Histogram {
        p50: sorted.get(p50_idx.saturating_sub(1)).copied().unwrap_or(0) as f64 / 1000.0,
        p90: sorted.get(p90_idx.saturating_sub(1)).copied().unwrap_or(0) as f64 / 1000.0,
        p95: sorted.get(p95_idx.saturating_sub(1)).copied().unwrap_or(0) as f64 / 1000.0,
        p99: sorted.get(p99_idx.saturating_sub(1)).copied().unwrap_or(0) as f64 / 1000.0,
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
