//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap every network step of a probe with a deadline
//! - Bound a whole attempt by the policy's per-attempt timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - An elapsed deadline maps to `FailureCause::Timeout`, distinct from I/O errors
//! - Dropping the timed-out future releases whatever it held (sockets included)

use std::future::Future;
use std::time::Duration;

use crate::probe::FailureCause;

/// Run `fut` with a deadline, mapping expiry to `FailureCause::Timeout(limit)`.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> Result<T, FailureCause>
where
    F: Future<Output = Result<T, FailureCause>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(FailureCause::Timeout(limit)),
    }
}
