//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Probe run:
//!     → retries.rs (RetryRunner: attempt, wait fixed delay, attempt again)
//!     → timeouts.rs (every attempt and every network step has a deadline)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Failures are values (`FailureCause`), caught per attempt and aggregated
//! - Only the final outcome crosses the runner boundary

pub mod retries;
pub mod timeouts;

pub use retries::{PolicyError, RetryPolicy, RetryRunner};
