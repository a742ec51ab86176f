//! Probe strategies.
//!
//! # Data Flow
//! ```text
//! caller builds a target (target.rs)
//!     → wraps it in a strategy (tcp.rs / http.rs)
//!     → RetryRunner calls Probe::attempt() up to N times
//!     → on success, Probe::enrich() adds optional metadata
//!     → one ProbeResult (result.rs)
//! ```
//!
//! # Design Decisions
//! - One `attempt()` call is exactly one health check; retries live elsewhere
//! - Enrichment never turns a passed check into a failure
//! - Every attempt acquires and releases its own connection
//! - Malformed targets are rejected when the strategy is built, not when it runs
//! - Strategies are immutable and can be attempted any number of times

pub mod http;
pub mod result;
pub mod target;
pub mod tcp;

use std::future::Future;

pub use http::HttpReadinessProbe;
pub use result::{FailureCause, Metadata, ProbeResult, ProbeSuccess};
pub use target::{HttpTarget, TcpTarget};
pub use tcp::TcpConnectProbe;

/// One way of testing liveness or readiness of a target.
pub trait Probe {
    /// Human-readable target, used in log events.
    fn target(&self) -> String;

    /// Perform a single health check.
    fn attempt(&self) -> impl Future<Output = Result<ProbeSuccess, FailureCause>> + Send;

    /// Optional follow-up after a successful attempt (e.g. fetching a version).
    ///
    /// Runs outside the attempt deadline and cannot fail the check: problems
    /// are recorded as `ProbeSuccess::warning`. Implementations bound their
    /// own network calls.
    fn enrich(&self, success: ProbeSuccess) -> impl Future<Output = ProbeSuccess> + Send {
        async move { success }
    }
}

/// Reject zero timeouts when a strategy is built.
pub(crate) fn require_timeout(
    timeout: std::time::Duration,
    what: &str,
) -> Result<std::time::Duration, FailureCause> {
    if timeout.is_zero() {
        return Err(FailureCause::InvalidTarget(format!(
            "{what} must be greater than zero"
        )));
    }
    Ok(timeout)
}
