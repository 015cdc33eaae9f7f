// Store metrics module
//
// Lightweight counters for persistence and mutation activity

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by the persistence adapter and the stores.
///
/// Uses relaxed atomics; the numbers are diagnostic and never drive behavior.
#[derive(Debug)]
pub struct Metrics {
    /// Successful envelope writes
    pub saves: AtomicU64,

    /// Failed envelope writes (including quota exhaustion)
    pub save_failures: AtomicU64,

    /// Load attempts against an available backend
    pub loads: AtomicU64,

    /// Loads discarded as invalid, incompatible or unreadable
    pub loads_rejected: AtomicU64,

    /// Committed quest store mutations
    pub mutations: AtomicU64,

    /// Mutations refused by a business rule (e.g. main quest limit)
    pub mutations_rejected: AtomicU64,

    /// State change events sent to at least one subscriber
    pub state_broadcasts: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            saves: AtomicU64::new(0),
            save_failures: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            loads_rejected: AtomicU64::new(0),
            mutations: AtomicU64::new(0),
            mutations_rejected: AtomicU64::new(0),
            state_broadcasts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_save(&self, success: bool) {
        if success {
            self.saves.fetch_add(1, Ordering::Relaxed);
        } else {
            self.save_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_rejected(&self) {
        self.loads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mutation_rejected(&self) {
        self.mutations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_state_broadcast(&self) {
        self.state_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Fraction of save attempts that failed, in `0.0..=1.0`
    pub fn save_failure_rate(&self) -> f64 {
        let failed = self.save_failures.load(Ordering::Relaxed);
        let total = self.saves.load(Ordering::Relaxed) + failed;
        if total > 0 {
            failed as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Questline Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Saves: {} ok, {} failed ({:.1}% failure rate)",
            self.saves.load(Ordering::Relaxed),
            self.save_failures.load(Ordering::Relaxed),
            self.save_failure_rate() * 100.0
        );
        tracing::info!(
            "Loads: {} attempted, {} rejected",
            self.loads.load(Ordering::Relaxed),
            self.loads_rejected.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Mutations: {} committed, {} rejected, broadcasts: {}",
            self.mutations.load(Ordering::Relaxed),
            self.mutations_rejected.load(Ordering::Relaxed),
            self.state_broadcasts.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
