pub mod aggregator;
pub mod rollup;
pub mod snapshot;
pub mod telemetry;
pub mod worker;
