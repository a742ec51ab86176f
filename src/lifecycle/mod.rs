//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation (cancel.rs):
//!     caller creates Cancel → passes clones to runs → trigger() stops them
//!
//! Signals (signals.rs):
//!     SIGINT/Ctrl-C → Cancel::trigger()
//! ```
//!
//! # Design Decisions
//! - One signal per process, shared by every run
//! - Cancellation interrupts both the in-flight attempt and the retry delay

pub mod cancel;
pub mod signals;

pub use cancel::Cancel;
