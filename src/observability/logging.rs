//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for binaries
//! - Keep log output off stdout, which carries the human report
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via `RUST_LOG`, falling back to a per-binary default

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "service_probe=info";

/// Install a global subscriber writing to stderr.
///
/// `verbose` raises the default filter to `debug`; an explicit `RUST_LOG`
/// always wins. Calling this twice is a no-op.
pub fn init(verbose: bool) {
    let default = if verbose {
        "service_probe=debug"
    } else {
        DEFAULT_FILTER
    };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
