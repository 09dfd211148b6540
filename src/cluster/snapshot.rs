use chrono::{DateTime, Local};

use super::rollup::Rollup;
use super::worker::WorkerRecord;

/// Everything one successful fetch produced. Replaced whole, never mutated.
#[derive(Clone, Debug, Default)]
pub struct ClusterSnapshot {
    /// Ordered by ascending address.
    pub workers: Vec<WorkerRecord>,
    pub rollup: Rollup,
    /// Entries the coordinator reported that failed validation.
    pub skipped_count: usize,
    /// `None` until the first successful fetch.
    pub fetched_at: Option<DateTime<Local>>,
}

impl ClusterSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn worker(&self, address: &str) -> Option<&WorkerRecord> {
        self.workers
            .binary_search_by(|w| w.address.as_str().cmp(address))
            .ok()
            .map(|i| &self.workers[i])
    }
}
