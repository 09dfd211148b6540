use std::sync::Arc;

use chrono::{DateTime, Local};

use super::rollup::Rollup;
use super::snapshot::ClusterSnapshot;
use super::telemetry::{RawWorkers, TelemetrySource};
use super::worker::WorkerRecord;
use crate::error::SourceError;

/// Owns the current worker set and replaces it wholesale on every successful fetch.
pub struct Aggregator<S> {
    source: S,
    snapshot: Arc<ClusterSnapshot>,
    last_fetch_failed: bool,
}

impl<S: TelemetrySource> Aggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            snapshot: Arc::new(ClusterSnapshot::empty()),
            last_fetch_failed: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The last complete snapshot. Stale data stays here after a failed fetch.
    pub fn snapshot(&self) -> &Arc<ClusterSnapshot> {
        &self.snapshot
    }

    pub fn last_fetch_failed(&self) -> bool {
        self.last_fetch_failed
    }

    /// Fetches from the source and applies the result in one step.
    pub async fn refresh(&mut self) -> Result<Arc<ClusterSnapshot>, SourceError> {
        let fetched = self.source.fetch().await;
        self.apply(fetched)
    }

    /// Installs the outcome of a fetch that may have run on another task.
    pub fn apply(
        &mut self,
        fetched: Result<RawWorkers, SourceError>,
    ) -> Result<Arc<ClusterSnapshot>, SourceError> {
        match fetched {
            Ok(raw) => {
                let snapshot = Arc::new(build_snapshot(&raw, Local::now()));
                tracing::debug!(
                    workers = snapshot.rollup.worker_count,
                    skipped = snapshot.skipped_count,
                    "applied worker snapshot"
                );
                self.snapshot = Arc::clone(&snapshot);
                self.last_fetch_failed = false;
                Ok(snapshot)
            }
            Err(err) => {
                tracing::warn!(error = %err, "fetch failed, keeping previous snapshot");
                self.last_fetch_failed = true;
                Err(err)
            }
        }
    }
}

/// Validates raw entries, drops the bad ones and computes the rollup.
pub fn build_snapshot(raw: &RawWorkers, fetched_at: DateTime<Local>) -> ClusterSnapshot {
    let mut workers = Vec::with_capacity(raw.len());
    let mut skipped_count = 0;

    for (address, value) in raw {
        match WorkerRecord::from_raw(address, value) {
            Ok(record) => workers.push(record),
            Err(err) => {
                tracing::warn!(address = err.address(), error = %err, "skipping worker");
                skipped_count += 1;
            }
        }
    }

    // BTreeMap iteration is already ordered; sort anyway so the order does not
    // depend on the container the source chose.
    workers.sort_by(|a, b| a.address.cmp(&b.address));
    let rollup = Rollup::from_records(&workers);

    ClusterSnapshot {
        workers,
        rollup,
        skipped_count,
        fetched_at: Some(fetched_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct ScriptedSource {
        responses: Arc<Mutex<VecDeque<Result<RawWorkers, SourceError>>>>,
    }

    impl ScriptedSource {
        fn push(&self, response: Result<RawWorkers, SourceError>) {
            self.responses.lock().unwrap().push_back(response);
        }
    }

    impl TelemetrySource for ScriptedSource {
        async fn fetch(&self) -> Result<RawWorkers, SourceError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(SourceError::Malformed("script exhausted".into())))
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn entry(cpu: f64, used: u64, limit: u64) -> serde_json::Value {
        json!({
            "memory_limit": limit,
            "metrics": {
                "memory": used, "cpu": cpu, "num_fds": 10,
                "executing": 1, "in_memory": 2, "ready": 3, "in_flight": 4
            }
        })
    }

    fn raw(entries: &[(&str, serde_json::Value)]) -> RawWorkers {
        entries
            .iter()
            .map(|(addr, v)| (addr.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn build_snapshot_skips_invalid_entries() {
        let workers = raw(&[
            ("tcp://b:1", entry(10.0, 100, 1000)),
            ("tcp://a:1", entry(30.0, 500, 1000)),
            ("tcp://c:1", entry(50.0, 100, 0)),
            ("tcp://d:1", json!({"memory_limit": 10})),
        ]);
        let snapshot = build_snapshot(&workers, Local::now());
        assert_eq!(snapshot.skipped_count, 2);
        assert_eq!(snapshot.rollup.worker_count, 2);
        let addresses: Vec<&str> = snapshot.workers.iter().map(|w| w.address.as_str()).collect();
        assert_eq!(addresses, vec!["tcp://a:1", "tcp://b:1"]);
        assert!((snapshot.rollup.avg_cpu - 20.0).abs() < 1e-9);
    }

    #[test]
    fn build_snapshot_of_nothing_is_zeroed() {
        let snapshot = build_snapshot(&RawWorkers::new(), Local::now());
        assert!(snapshot.workers.is_empty());
        assert_eq!(snapshot.rollup, Rollup::default());
        assert!(snapshot.fetched_at.is_some());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_snapshot() {
        let source = ScriptedSource::default();
        source.push(Ok(raw(&[("tcp://a:1", entry(10.0, 100, 1000))])));
        source.push(Err(SourceError::Timeout(Duration::from_secs(3))));

        let mut aggregator = Aggregator::new(source);
        let first = aggregator.refresh().await.unwrap();
        assert!(!aggregator.last_fetch_failed());

        let err = aggregator.refresh().await.unwrap_err();
        assert!(matches!(err, SourceError::Timeout(_)));
        assert!(aggregator.last_fetch_failed());
        assert!(Arc::ptr_eq(aggregator.snapshot(), &first));
        assert_eq!(aggregator.snapshot().workers.len(), 1);
    }

    #[tokio::test]
    async fn success_after_failure_clears_flag() {
        let source = ScriptedSource::default();
        source.push(Err(SourceError::Status(502)));
        source.push(Ok(raw(&[("tcp://a:1", entry(10.0, 100, 1000))])));

        let mut aggregator = Aggregator::new(source);
        assert!(aggregator.refresh().await.is_err());
        assert!(aggregator.last_fetch_failed());
        assert!(aggregator.snapshot().fetched_at.is_none());

        aggregator.refresh().await.unwrap();
        assert!(!aggregator.last_fetch_failed());
        assert_eq!(aggregator.snapshot().rollup.worker_count, 1);
    }

    #[test]
    fn apply_replaces_snapshot_wholesale() {
        let mut aggregator = Aggregator::new(ScriptedSource::default());
        aggregator
            .apply(Ok(raw(&[
                ("tcp://a:1", entry(10.0, 100, 1000)),
                ("tcp://b:1", entry(10.0, 100, 1000)),
            ])))
            .unwrap();
        aggregator
            .apply(Ok(raw(&[("tcp://c:1", entry(10.0, 100, 1000))])))
            .unwrap();
        let addresses: Vec<&str> = aggregator
            .snapshot()
            .workers
            .iter()
            .map(|w| w.address.as_str())
            .collect();
        assert_eq!(addresses, vec!["tcp://c:1"]);
        assert_eq!(aggregator.snapshot().rollup.total_fds, 10);
    }
}
