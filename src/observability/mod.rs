//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! probes, runner, config loader
//!     → tracing events (target, attempt, cause)
//!     → logging.rs subscriber → stderr
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings, for anything machine-relevant
//! - Library code only emits events; binaries decide where they go

pub mod logging;
