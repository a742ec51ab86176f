//! Configuration schema definitions.
//!
//! A suite file lists the checks to run plus a default retry policy.
//! All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::probe::http::{DEFAULT_META_PATH, DEFAULT_READY_PATH};
use crate::probe::tcp::DEFAULT_WRITE_TIMEOUT;
use crate::resilience::{PolicyError, RetryPolicy};

/// Root configuration: a suite of checks.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SuiteConfig {
    /// Policy applied to every check without its own override.
    pub policy: PolicyConfig,

    /// Checks, run in file order.
    pub checks: Vec<CheckConfig>,
}

/// Retry policy as written in the config file.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Maximum attempts per check (>= 1).
    pub max_attempts: u32,

    /// Delay between failed attempts in milliseconds.
    pub delay_ms: u64,

    /// Per-attempt timeout in milliseconds (> 0).
    pub timeout_ms: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
            timeout_ms: 5000,
        }
    }
}

impl PolicyConfig {
    /// Overlay the fields set in `patch`.
    pub fn merged(self, patch: Option<&PolicyOverride>) -> Self {
        let Some(patch) = patch else { return self };
        Self {
            max_attempts: patch.max_attempts.unwrap_or(self.max_attempts),
            delay_ms: patch.delay_ms.unwrap_or(self.delay_ms),
            timeout_ms: patch.timeout_ms.unwrap_or(self.timeout_ms),
        }
    }
}

impl TryFrom<PolicyConfig> for RetryPolicy {
    type Error = PolicyError;

    fn try_from(config: PolicyConfig) -> Result<Self, Self::Error> {
        RetryPolicy::new(
            config.max_attempts,
            Duration::from_millis(config.delay_ms),
            Duration::from_millis(config.timeout_ms),
        )
    }
}

/// Per-check policy fields; unset fields inherit from the suite policy.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct PolicyOverride {
    pub max_attempts: Option<u32>,
    pub delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
}

/// One named check.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckConfig {
    /// Name used in reports and `--only` filters.
    pub name: String,

    #[serde(default)]
    pub policy: Option<PolicyOverride>,

    #[serde(flatten)]
    pub kind: CheckKind,
}

impl CheckConfig {
    /// Effective policy for this check under `suite`.
    pub fn retry_policy(&self, suite: PolicyConfig) -> Result<RetryPolicy, PolicyError> {
        suite.merged(self.policy.as_ref()).try_into()
    }
}

/// Probe strategy and its target parameters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CheckKind {
    Tcp {
        address: String,

        #[serde(default = "default_write_timeout_ms")]
        write_timeout_ms: u64,
    },
    Http {
        base_url: String,

        #[serde(default = "default_ready_path")]
        ready_path: String,

        #[serde(default = "default_expected_status")]
        expected_status: u16,

        /// Metadata path. Omit to skip enrichment.
        #[serde(default)]
        meta_path: Option<String>,
    },
}

fn default_write_timeout_ms() -> u64 {
    DEFAULT_WRITE_TIMEOUT.as_millis() as u64
}

fn default_ready_path() -> String {
    DEFAULT_READY_PATH.to_string()
}

fn default_expected_status() -> u16 {
    200
}

/// Suite equivalent to the two stock smoke tests: a document database over
/// raw TCP and a vector-search service over HTTP.
pub fn stock_suite() -> SuiteConfig {
    SuiteConfig {
        policy: PolicyConfig::default(),
        checks: vec![
            CheckConfig {
                name: "mongodb".to_string(),
                policy: None,
                kind: CheckKind::Tcp {
                    address: "localhost:27017".to_string(),
                    write_timeout_ms: default_write_timeout_ms(),
                },
            },
            CheckConfig {
                name: "weaviate".to_string(),
                policy: Some(PolicyOverride {
                    max_attempts: Some(1),
                    ..PolicyOverride::default()
                }),
                kind: CheckKind::Http {
                    base_url: "http://localhost:8080".to_string(),
                    ready_path: default_ready_path(),
                    expected_status: default_expected_status(),
                    meta_path: Some(DEFAULT_META_PATH.to_string()),
                },
            },
        ],
    }
}
