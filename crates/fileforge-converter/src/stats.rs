//! Per-category conversion counters.
//!
//! All counters live behind one mutex so a snapshot can never observe a
//! category increment without the matching total and success/failure
//! increment.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Bucket for attempts whose tool could not be resolved.
pub const OTHER_CATEGORY: &str = "Other";

/// Thread-safe conversion counters. Counts only grow and reset on restart.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    inner: Mutex<StatsSnapshot>,
}

/// A point-in-time copy of the counters.
///
/// `total_conversions == success_count + failure_count == Σ categories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Attempts per category name.
    pub categories: BTreeMap<String, u64>,
    /// All attempts.
    pub total_conversions: u64,
    /// Successful attempts.
    pub success_count: u64,
    /// Failed attempts.
    pub failure_count: u64,
}

impl StatsSnapshot {
    /// Share of successful attempts in percent, `0.0` when nothing ran.
    pub fn success_rate(&self) -> f64 {
        if self.total_conversions == 0 {
            0.0
        } else {
            self.success_count as f64 * 100.0 / self.total_conversions as f64
        }
    }
}

impl StatsRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one attempt under `category`.
    pub fn record(&self, category: &str, success: bool) {
        let mut stats = self.lock();
        *stats.categories.entry(category.to_string()).or_insert(0) += 1;
        stats.total_conversions += 1;
        if success {
            stats.success_count += 1;
        } else {
            stats.failure_count += 1;
        }
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, StatsSnapshot> {
        // Counter updates cannot leave the map half-written; keep serving after a poison.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
