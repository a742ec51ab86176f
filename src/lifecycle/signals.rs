//! OS signal handling.
//!
//! # Responsibilities
//! - Translate Ctrl-C / SIGINT into the probe cancellation signal
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The core never exits the process; a signal only cancels the run in flight

use tokio::task::JoinHandle;

use super::Cancel;

/// Trigger `cancel` when the process receives Ctrl-C.
pub fn cancel_on_ctrl_c(cancel: Cancel) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling probes");
                cancel.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}
