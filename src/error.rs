use std::time::Duration;

use thiserror::Error;

/// Any failure that makes the telemetry source unusable for one fetch cycle.
///
/// These are recoverable: the aggregator keeps the previous snapshot and the
/// next scheduled tick tries again.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("coordinator did not answer within {0:?}")]
    Timeout(Duration),
    #[error("could not reach coordinator: {0}")]
    Request(#[source] reqwest::Error),
    #[error("coordinator answered with HTTP {0}")]
    Status(u16),
    #[error("malformed status payload: {0}")]
    Malformed(String),
}

/// A single worker entry that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("worker {address}: missing field `{field}`")]
    MissingField {
        address: String,
        field: &'static str,
    },
    #[error("worker {address}: memory_limit must be greater than zero")]
    ZeroMemoryLimit { address: String },
    #[error("worker {address}: {reason}")]
    Malformed { address: String, reason: String },
}

impl ValidationError {
    pub fn address(&self) -> &str {
        match self {
            ValidationError::MissingField { address, .. }
            | ValidationError::ZeroMemoryLimit { address }
            | ValidationError::Malformed { address, .. } => address,
        }
    }
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("scheduler address is empty")]
    Empty,
    #[error("invalid scheduler address `{input}`: {source}")]
    Parse {
        input: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported scheme `{0}`, expected http or https")]
    Scheme(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// The coordinator could not be reached while starting up.
#[derive(Debug, Error)]
#[error("cannot reach coordinator at {endpoint}: {source}")]
pub struct StartupFailure {
    pub endpoint: String,
    #[source]
    pub source: SourceError,
}
