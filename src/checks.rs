//! Check entry points.
//!
//! Build a strategy from plain target parameters, then run it under a retry
//! policy. A malformed target never reaches the network: it comes back as
//! `Failure { InvalidTarget, attempts: 0 }`.

use std::time::Duration;

use crate::config::{CheckConfig, CheckKind, PolicyConfig};
use crate::lifecycle::Cancel;
use crate::probe::tcp::DEFAULT_WRITE_TIMEOUT;
use crate::probe::{HttpReadinessProbe, HttpTarget, ProbeResult, TcpConnectProbe};
use crate::resilience::{PolicyError, RetryPolicy, RetryRunner};

/// Probe a raw TCP endpoint (`host:port`).
pub async fn run_tcp_check(address: &str, policy: RetryPolicy, cancel: Cancel) -> ProbeResult {
    run_tcp_check_with_write_timeout(address, DEFAULT_WRITE_TIMEOUT, policy, cancel).await
}

/// Like [`run_tcp_check`], with an explicit sentinel write deadline.
pub async fn run_tcp_check_with_write_timeout(
    address: &str,
    write_timeout: Duration,
    policy: RetryPolicy,
    cancel: Cancel,
) -> ProbeResult {
    let probe = TcpConnectProbe::new(address, policy.attempt_timeout())
        .and_then(|probe| probe.with_write_timeout(write_timeout));
    match probe {
        Ok(probe) => RetryRunner::new(policy, cancel).run(&probe).await,
        Err(cause) => {
            tracing::warn!(address, cause = %cause, "Rejected TCP target");
            ProbeResult::failed(cause, 0)
        }
    }
}

/// Probe an HTTP readiness endpoint, optionally enriching the result from
/// `meta_path`.
pub async fn run_http_check(
    base_url: &str,
    ready_path: &str,
    expected_status: u16,
    meta_path: Option<&str>,
    policy: RetryPolicy,
    cancel: Cancel,
) -> ProbeResult {
    let probe = HttpTarget::new(base_url, ready_path, expected_status, meta_path)
        .and_then(|target| HttpReadinessProbe::new(target, policy.attempt_timeout()));
    match probe {
        Ok(probe) => RetryRunner::new(policy, cancel).run(&probe).await,
        Err(cause) => {
            tracing::warn!(base_url, cause = %cause, "Rejected HTTP target");
            ProbeResult::failed(cause, 0)
        }
    }
}

/// Run one check from a suite file under the suite's default policy.
pub async fn run_configured_check(
    check: &CheckConfig,
    suite_policy: PolicyConfig,
    cancel: Cancel,
) -> Result<ProbeResult, PolicyError> {
    let policy = check.retry_policy(suite_policy)?;
    let result = match &check.kind {
        CheckKind::Tcp {
            address,
            write_timeout_ms,
        } => {
            run_tcp_check_with_write_timeout(
                address,
                Duration::from_millis(*write_timeout_ms),
                policy,
                cancel,
            )
            .await
        }
        CheckKind::Http {
            base_url,
            ready_path,
            expected_status,
            meta_path,
        } => {
            run_http_check(
                base_url,
                ready_path,
                *expected_status,
                meta_path.as_deref(),
                policy,
                cancel,
            )
            .await
        }
    };
    Ok(result)
}
