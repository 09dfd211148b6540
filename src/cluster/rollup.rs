use super::worker::WorkerRecord;

/// Cluster-wide aggregates over one record set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rollup {
    pub worker_count: usize,
    pub avg_cpu: f64,
    pub avg_memory_utilization: f64,
    pub total_fds: u64,
    pub total_executing: u64,
    pub total_in_memory: u64,
    pub total_ready: u64,
    pub total_in_flight: u64,
}

impl Rollup {
    /// Recomputes every aggregate from `workers`. An empty set yields all zeros.
    pub fn from_records(workers: &[WorkerRecord]) -> Self {
        let mut rollup = Rollup {
            worker_count: workers.len(),
            ..Rollup::default()
        };
        if workers.is_empty() {
            return rollup;
        }

        let mut cpu_sum = 0.0;
        let mut util_sum = 0.0;
        for worker in workers {
            cpu_sum += worker.cpu_percent;
            util_sum += worker.memory_utilization();
            rollup.total_fds += worker.fd_count;
            rollup.total_executing += worker.executing;
            rollup.total_in_memory += worker.in_memory;
            rollup.total_ready += worker.ready;
            rollup.total_in_flight += worker.in_flight;
        }

        let n = workers.len() as f64;
        rollup.avg_cpu = cpu_sum / n;
        rollup.avg_memory_utilization = util_sum / n;
        rollup
    }
}
