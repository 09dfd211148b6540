use serde::Deserialize;
use serde_json::Value;

use crate::error::ValidationError;

/// One worker's telemetry as of a single fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerRecord {
    pub address: String,
    pub memory_limit: u64,
    pub memory_used: u64,
    pub cpu_percent: f64,
    pub fd_count: u64,
    pub executing: u64,
    pub in_memory: u64,
    pub ready: u64,
    pub in_flight: u64,
}

impl WorkerRecord {
    /// Used over limit. Not clamped: measurement skew can push it past 1.0.
    pub fn memory_utilization(&self) -> f64 {
        self.memory_used as f64 / self.memory_limit as f64
    }

    pub fn from_raw(address: &str, raw: &Value) -> Result<Self, ValidationError> {
        let parsed = RawWorker::deserialize(raw).map_err(|e| ValidationError::Malformed {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
        parsed.validate(address)
    }
}

#[derive(Debug, Deserialize)]
struct RawWorker {
    memory_limit: Option<u64>,
    metrics: Option<RawMetrics>,
}

#[derive(Debug, Deserialize)]
struct RawMetrics {
    memory: Option<u64>,
    cpu: Option<f64>,
    num_fds: Option<u64>,
    executing: Option<u64>,
    in_memory: Option<u64>,
    ready: Option<u64>,
    in_flight: Option<u64>,
}

impl RawWorker {
    fn validate(self, address: &str) -> Result<WorkerRecord, ValidationError> {
        let missing = |field: &'static str| ValidationError::MissingField {
            address: address.to_string(),
            field,
        };

        let memory_limit = self.memory_limit.ok_or_else(|| missing("memory_limit"))?;
        if memory_limit == 0 {
            return Err(ValidationError::ZeroMemoryLimit {
                address: address.to_string(),
            });
        }
        let metrics = self.metrics.ok_or_else(|| missing("metrics"))?;

        Ok(WorkerRecord {
            address: address.to_string(),
            memory_limit,
            memory_used: metrics.memory.ok_or_else(|| missing("metrics.memory"))?,
            cpu_percent: metrics.cpu.ok_or_else(|| missing("metrics.cpu"))?,
            fd_count: metrics.num_fds.ok_or_else(|| missing("metrics.num_fds"))?,
            executing: metrics
                .executing
                .ok_or_else(|| missing("metrics.executing"))?,
            in_memory: metrics
                .in_memory
                .ok_or_else(|| missing("metrics.in_memory"))?,
            ready: metrics.ready.ok_or_else(|| missing("metrics.ready"))?,
            in_flight: metrics
                .in_flight
                .ok_or_else(|| missing("metrics.in_flight"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "memory_limit": 4_000_000_000u64,
            "metrics": {
                "memory": 1_000_000_000u64,
                "cpu": 12.5,
                "num_fds": 31,
                "executing": 2,
                "in_memory": 40,
                "ready": 3,
                "in_flight": 1
            }
        })
    }

    #[test]
    fn builds_record_from_complete_payload() {
        let record = WorkerRecord::from_raw("tcp://10.0.0.1:4000", &valid_payload()).unwrap();
        assert_eq!(record.address, "tcp://10.0.0.1:4000");
        assert_eq!(record.memory_limit, 4_000_000_000);
        assert_eq!(record.fd_count, 31);
        assert_eq!(record.in_memory, 40);
        assert!((record.memory_utilization() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn ignores_unknown_fields() {
        let mut payload = valid_payload();
        payload["nthreads"] = json!(4);
        payload["metrics"]["bandwidth"] = json!({"total": 100});
        assert!(WorkerRecord::from_raw("w", &payload).is_ok());
    }

    #[test]
    fn zero_memory_limit_is_rejected() {
        let mut payload = valid_payload();
        payload["memory_limit"] = json!(0);
        assert_eq!(
            WorkerRecord::from_raw("w", &payload),
            Err(ValidationError::ZeroMemoryLimit {
                address: "w".to_string()
            })
        );
    }

    #[test]
    fn null_memory_limit_is_missing() {
        let mut payload = valid_payload();
        payload["memory_limit"] = Value::Null;
        assert_eq!(
            WorkerRecord::from_raw("w", &payload),
            Err(ValidationError::MissingField {
                address: "w".to_string(),
                field: "memory_limit"
            })
        );
    }

    #[test]
    fn missing_metric_names_the_field() {
        let mut payload = valid_payload();
        payload["metrics"]
            .as_object_mut()
            .unwrap()
            .remove("in_flight");
        let err = WorkerRecord::from_raw("w", &payload).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                address: "w".to_string(),
                field: "metrics.in_flight"
            }
        );
    }

    #[test]
    fn negative_counter_is_malformed() {
        let mut payload = valid_payload();
        payload["metrics"]["ready"] = json!(-1);
        let err = WorkerRecord::from_raw("w", &payload).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }));
    }

    #[test]
    fn non_object_entry_is_malformed() {
        let err = WorkerRecord::from_raw("w", &json!("offline")).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }));
    }

    #[test]
    fn utilization_may_exceed_one() {
        let mut payload = valid_payload();
        payload["metrics"]["memory"] = json!(5_000_000_000u64);
        let record = WorkerRecord::from_raw("w", &payload).unwrap();
        assert!(record.memory_utilization() > 1.0);
    }
}
