//! Service readiness probes.
//!
//! Connectivity smoke tests for backing services: a raw TCP connect probe and
//! an HTTP readiness probe, both driven by a fixed-delay retry runner that can
//! be cancelled and that always returns a single `ProbeResult`.

pub mod checks;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod resilience;

pub use checks::{run_http_check, run_tcp_check};
pub use lifecycle::Cancel;
pub use probe::{FailureCause, Metadata, Probe, ProbeResult};
pub use resilience::{RetryPolicy, RetryRunner};
