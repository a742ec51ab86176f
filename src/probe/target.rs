//! Probe targets.
//!
//! Targets are parsed and validated once, up front, so that a malformed
//! address or URL fails with `InvalidTarget` before any network call is made.
//! Both target types are immutable after construction.

use std::fmt;
use url::Url;

use super::FailureCause;

/// `host:port` endpoint for raw TCP probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpTarget {
    host: String,
    port: u16,
}

impl TcpTarget {
    /// Parse `host:port`. Bracketed IPv6 hosts (`[::1]:27017`) are accepted.
    pub fn parse(address: &str) -> Result<Self, FailureCause> {
        let address = address.trim();
        if address.is_empty() {
            return Err(FailureCause::InvalidTarget("empty address".into()));
        }

        let (host, port) = address.rsplit_once(':').ok_or_else(|| {
            FailureCause::InvalidTarget(format!("address `{address}` is missing a port"))
        })?;

        let host = match host.strip_prefix('[') {
            Some(inner) => inner.strip_suffix(']').ok_or_else(|| {
                FailureCause::InvalidTarget(format!("unbalanced brackets in `{address}`"))
            })?,
            None if host.contains(':') => {
                return Err(FailureCause::InvalidTarget(format!(
                    "IPv6 address `{address}` must be bracketed"
                )))
            }
            None => host,
        };
        if host.is_empty() {
            return Err(FailureCause::InvalidTarget(format!(
                "address `{address}` is missing a host"
            )));
        }

        let port: u16 = port.parse().map_err(|_| {
            FailureCause::InvalidTarget(format!("invalid port `{port}` in `{address}`"))
        })?;
        if port == 0 {
            return Err(FailureCause::InvalidTarget(format!(
                "port 0 is not connectable in `{address}`"
            )));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for TcpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// HTTP endpoint: base URL plus a readiness path and an optional metadata path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTarget {
    ready_url: Url,
    meta_url: Option<Url>,
    expected_status: u16,
}

impl HttpTarget {
    pub fn new(
        base_url: &str,
        ready_path: &str,
        expected_status: u16,
        meta_path: Option<&str>,
    ) -> Result<Self, FailureCause> {
        if !(100..=999).contains(&expected_status) {
            return Err(FailureCause::InvalidTarget(format!(
                "expected status {expected_status} is not a valid HTTP status"
            )));
        }

        let ready_url = join_url(base_url, ready_path)?;
        let meta_url = meta_path.map(|path| join_url(base_url, path)).transpose()?;

        Ok(Self {
            ready_url,
            meta_url,
            expected_status,
        })
    }

    pub fn ready_url(&self) -> &Url {
        &self.ready_url
    }

    pub fn meta_url(&self) -> Option<&Url> {
        self.meta_url.as_ref()
    }

    pub fn expected_status(&self) -> u16 {
        self.expected_status
    }
}

/// Concatenate a base URL and a path, normalising the slash between them.
///
/// Plain concatenation rather than `Url::join` so that a base carrying a path
/// prefix (`http://host/api`) keeps it.
fn join_url(base_url: &str, path: &str) -> Result<Url, FailureCause> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Err(FailureCause::InvalidTarget("empty base URL".into()));
    }

    let base = Url::parse(base_url)
        .map_err(|e| FailureCause::InvalidTarget(format!("invalid base URL `{base_url}`: {e}")))?;
    match base.scheme() {
        "http" | "https" => {}
        other => {
            return Err(FailureCause::InvalidTarget(format!(
                "unsupported scheme `{other}` in `{base_url}`"
            )))
        }
    }
    if base.host_str().map_or(true, str::is_empty) {
        return Err(FailureCause::InvalidTarget(format!(
            "base URL `{base_url}` has no host"
        )));
    }

    let base = base_url.trim_end_matches('/');
    let joined = if path.is_empty() || path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    };

    Url::parse(&joined)
        .map_err(|e| FailureCause::InvalidTarget(format!("invalid URL `{joined}`: {e}")))
}
