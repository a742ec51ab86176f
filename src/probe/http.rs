//! HTTP readiness probe.
//!
//! Issues a GET against the readiness URL and compares the status code with
//! the expected one. When a metadata URL is configured, `enrich` issues a second
//! GET after readiness passes and flattens its JSON body into
//! `ProbeSuccess::metadata`. Metadata problems, a stalled metadata endpoint
//! included, never fail the probe; they downgrade to a warning.

use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{require_timeout, FailureCause, HttpTarget, Metadata, Probe, ProbeSuccess};

/// Readiness path used by default.
pub const DEFAULT_READY_PATH: &str = "/v1/.well-known/ready";

/// Metadata path used by default.
pub const DEFAULT_META_PATH: &str = "/v1/meta";

/// HTTP GET probe with optional metadata enrichment.
#[derive(Debug, Clone)]
pub struct HttpReadinessProbe {
    target: HttpTarget,
    client: Client,
    /// Bound on each request, metadata included.
    timeout: Duration,
}

impl HttpReadinessProbe {
    /// Build a probe for `target`. Each request is bounded by `timeout`.
    pub fn new(target: HttpTarget, timeout: Duration) -> Result<Self, FailureCause> {
        let timeout = require_timeout(timeout, "per-attempt timeout")?;
        let client = Client::builder()
            .timeout(timeout)
            // Probe the target itself, never an intermediary.
            .no_proxy()
            .user_agent(concat!("service-probe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FailureCause::InvalidTarget(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            target,
            client,
            timeout,
        })
    }

    pub fn http_target(&self) -> &HttpTarget {
        &self.target
    }

    /// Fetch and flatten the metadata document. Any error is returned as text.
    async fn fetch_metadata(&self, url: &url::Url) -> Result<Metadata, String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| format!("failed to get metadata: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("metadata endpoint returned status {}", status.as_u16()));
        }

        let document: Map<String, Value> = response
            .json()
            .await
            .map_err(|e| format!("failed to decode metadata: {e}"))?;

        Ok(flatten_metadata(document))
    }
}

impl Probe for HttpReadinessProbe {
    fn target(&self) -> String {
        self.target.ready_url().to_string()
    }

    async fn attempt(&self) -> Result<ProbeSuccess, FailureCause> {
        let ready_url = self.target.ready_url();
        debug!(url = %ready_url, "HTTP readiness probe");

        let response = self
            .client
            .get(ready_url.clone())
            .send()
            .await
            .map_err(|e| FailureCause::Unreachable(e.to_string()))?;

        let code = response.status().as_u16();
        if code != self.target.expected_status() {
            return Err(FailureCause::UnexpectedStatus { code });
        }
        Ok(ProbeSuccess::default())
    }

    async fn enrich(&self, success: ProbeSuccess) -> ProbeSuccess {
        let Some(meta_url) = self.target.meta_url() else {
            return success;
        };

        let fetched = match tokio::time::timeout(self.timeout, self.fetch_metadata(meta_url)).await {
            Ok(fetched) => fetched,
            Err(_) => Err(format!("metadata request timed out after {:?}", self.timeout)),
        };

        match fetched {
            Ok(metadata) => ProbeSuccess {
                metadata,
                ..success
            },
            Err(warning) => {
                warn!(url = %meta_url, warning = %warning, "Metadata unavailable, readiness still passed");
                ProbeSuccess::with_warning(warning)
            }
        }
    }
}

/// Keep top-level scalar fields of a JSON object as strings. Nested values and
/// nulls are skipped.
fn flatten_metadata(document: Map<String, Value>) -> Metadata {
    document
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        })
        .collect()
}
