//! Probe outcome types and the failure taxonomy.

use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Key/value details reported by a successful probe (e.g. a server version).
pub type Metadata = BTreeMap<String, String>;

/// Why a single attempt, or a whole run, failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// Target string was empty or malformed. Detected before any network call.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// TCP connection could not be established.
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// Attempt exceeded its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Connection opened but the sentinel write failed (half-closed socket).
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// HTTP request did not produce a response.
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// HTTP response carried a status other than the expected one.
    #[error("unexpected status {code}")]
    UnexpectedStatus { code: u16 },

    /// Caller cancelled the run.
    #[error("cancelled")]
    Cancelled,
}

/// Output of one successful attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeSuccess {
    pub metadata: Metadata,
    /// Soft warning raised by optional enrichment steps. Never a failure.
    pub warning: Option<String>,
}

impl ProbeSuccess {
    /// Success with metadata attached.
    pub fn with_metadata(metadata: Metadata) -> Self {
        Self {
            metadata,
            warning: None,
        }
    }

    /// Success with empty metadata and a soft warning.
    pub fn with_warning(warning: impl Into<String>) -> Self {
        Self {
            metadata: Metadata::new(),
            warning: Some(warning.into()),
        }
    }
}

/// Final outcome of a retry run. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Success {
        metadata: Metadata,
        warning: Option<String>,
        /// Number of attempts used, including the successful one.
        attempts: u32,
    },
    Failure {
        /// Cause of the last attempt only.
        cause: FailureCause,
        attempts: u32,
    },
}

impl ProbeResult {
    pub(crate) fn succeeded(success: ProbeSuccess, attempts: u32) -> Self {
        ProbeResult::Success {
            metadata: success.metadata,
            warning: success.warning,
            attempts,
        }
    }

    pub(crate) fn failed(cause: FailureCause, attempts: u32) -> Self {
        ProbeResult::Failure { cause, attempts }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeResult::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ProbeResult::Success { attempts, .. } | ProbeResult::Failure { attempts, .. } => {
                *attempts
            }
        }
    }

    /// Failure cause, if the run failed.
    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            ProbeResult::Success { .. } => None,
            ProbeResult::Failure { cause, .. } => Some(cause),
        }
    }

    /// Metadata of a successful run; `None` on failure.
    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            ProbeResult::Success { metadata, .. } => Some(metadata),
            ProbeResult::Failure { .. } => None,
        }
    }
}
