use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{EndpointError, SourceError};

/// Raw per-worker payloads keyed by worker address, not yet validated.
pub type RawWorkers = BTreeMap<String, Value>;

const IDENTITY_PATH: &str = "json/identity.json";

/// Where worker telemetry comes from.
///
/// Implementations are cheap to clone so a fetch can be moved onto its own task.
pub trait TelemetrySource: Clone + Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<RawWorkers, SourceError>> + Send;

    /// Human-readable endpoint, shown in the header.
    fn describe(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct SchedulerIdentity {
    workers: BTreeMap<String, Value>,
}

/// Parses the coordinator's identity document, keeping worker entries raw so
/// one bad entry cannot fail the whole response.
pub fn parse_identity(body: &[u8]) -> Result<RawWorkers, SourceError> {
    let identity: SchedulerIdentity =
        serde_json::from_slice(body).map_err(|e| SourceError::Malformed(e.to_string()))?;
    Ok(identity.workers)
}

/// Accepts `host:port` or an http(s) URL and returns the base URL.
pub fn parse_endpoint(input: &str) -> Result<Url, EndpointError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EndpointError::Empty);
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    let mut url = Url::parse(&with_scheme).map_err(|source| EndpointError::Parse {
        input: trimmed.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(EndpointError::Scheme(other.to_string())),
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Fetches worker status from the coordinator's HTTP dashboard.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
    identity_url: Url,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, EndpointError> {
        let base = parse_endpoint(endpoint)?;
        let identity_url = base
            .join(IDENTITY_PATH)
            .map_err(|source| EndpointError::Parse {
                input: endpoint.to_string(),
                source,
            })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(EndpointError::Client)?;
        Ok(Self {
            client,
            base,
            identity_url,
            timeout,
        })
    }

    pub fn identity_url(&self) -> &Url {
        &self.identity_url
    }

    fn classify(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout(self.timeout)
        } else {
            SourceError::Request(err)
        }
    }
}

impl TelemetrySource for HttpSource {
    async fn fetch(&self) -> Result<RawWorkers, SourceError> {
        tracing::debug!(url = %self.identity_url, "fetching worker status");
        let response = self
            .client
            .get(self.identity_url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        parse_identity(&body)
    }

    fn describe(&self) -> String {
        self.base.as_str().trim_end_matches('/').to_string()
    }
}
