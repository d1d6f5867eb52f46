//! Telemetry helpers for the heal pipeline.
//!
//! Process-wide counters and latency aggregates.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

static HEAL_TOTAL: AtomicU64 = AtomicU64::new(0);
static HEAL_EMPTY: AtomicU64 = AtomicU64::new(0);
static HEAL_FAULTED: AtomicU64 = AtomicU64::new(0);
static HEAL_LAT_NS: AtomicU64 = AtomicU64::new(0);
static HEAL_LAT_SAMPLES: AtomicU64 = AtomicU64::new(0);

static CANDIDATES_FOUND: AtomicU64 = AtomicU64::new(0);
static CANDIDATES_KEPT: AtomicU64 = AtomicU64::new(0);
static RESULTS_EMITTED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HealMetricSnapshot {
    pub heals: u64,
    pub empty: u64,
    pub faulted: u64,
    pub avg_ms: f64,
    pub candidates_found: u64,
    pub candidates_kept: u64,
    pub results_emitted: u64,
}

pub fn record_heal(results: usize, duration: Duration) {
    HEAL_TOTAL.fetch_add(1, Ordering::Relaxed);
    if results == 0 {
        HEAL_EMPTY.fetch_add(1, Ordering::Relaxed);
    }
    RESULTS_EMITTED.fetch_add(results as u64, Ordering::Relaxed);
    record_latency(duration);
}

pub fn record_fault(duration: Duration) {
    HEAL_TOTAL.fetch_add(1, Ordering::Relaxed);
    HEAL_EMPTY.fetch_add(1, Ordering::Relaxed);
    HEAL_FAULTED.fetch_add(1, Ordering::Relaxed);
    record_latency(duration);
}

pub fn record_candidates(found: usize, kept: usize) {
    CANDIDATES_FOUND.fetch_add(found as u64, Ordering::Relaxed);
    CANDIDATES_KEPT.fetch_add(kept as u64, Ordering::Relaxed);
}

pub fn snapshot() -> HealMetricSnapshot {
    let samples = HEAL_LAT_SAMPLES.load(Ordering::Relaxed);
    let avg_ms = if samples == 0 {
        0.0
    } else {
        (HEAL_LAT_NS.load(Ordering::Relaxed) as f64 / samples as f64) / 1_000_000.0
    };
    HealMetricSnapshot {
        heals: HEAL_TOTAL.load(Ordering::Relaxed),
        empty: HEAL_EMPTY.load(Ordering::Relaxed),
        faulted: HEAL_FAULTED.load(Ordering::Relaxed),
        avg_ms,
        candidates_found: CANDIDATES_FOUND.load(Ordering::Relaxed),
        candidates_kept: CANDIDATES_KEPT.load(Ordering::Relaxed),
        results_emitted: RESULTS_EMITTED.load(Ordering::Relaxed),
    }
}

fn record_latency(duration: Duration) {
    let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
    HEAL_LAT_NS.fetch_add(nanos, Ordering::Relaxed);
    HEAL_LAT_SAMPLES.fetch_add(1, Ordering::Relaxed);
}
