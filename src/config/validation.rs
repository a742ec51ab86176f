//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check names are present and unique
//! - Validate policy ranges (attempts >= 1, timeout > 0)
//! - Validate targets with the same parsers the probes use
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SuiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before any check is executed

use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::config::schema::{CheckKind, SuiteConfig};
use crate::probe::{FailureCause, HttpTarget, TcpTarget};
use crate::resilience::{PolicyError, RetryPolicy};

/// A single semantic problem in a suite file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no checks configured")]
    NoChecks,

    #[error("check #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("duplicate check name `{0}`")]
    DuplicateName(String),

    #[error("{scope}: {source}")]
    Policy {
        scope: String,
        #[source]
        source: PolicyError,
    },

    #[error("check `{name}`: {cause}")]
    Target { name: String, cause: FailureCause },

    #[error("check `{name}`: write timeout must be greater than zero")]
    ZeroWriteTimeout { name: String },
}

/// Validate a parsed suite.
pub fn validate_config(config: &SuiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.checks.is_empty() {
        errors.push(ValidationError::NoChecks);
    }

    if let Err(source) = RetryPolicy::try_from(config.policy) {
        errors.push(ValidationError::Policy {
            scope: "suite policy".to_string(),
            source,
        });
    }

    let mut seen = HashSet::new();
    for (index, check) in config.checks.iter().enumerate() {
        let name = check.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !seen.insert(name) {
            errors.push(ValidationError::DuplicateName(name.to_string()));
        }

        // A bad suite policy is already reported once above.
        if check.policy.is_some() {
            if let Err(source) = check.retry_policy(config.policy) {
                errors.push(ValidationError::Policy {
                    scope: format!("check `{name}`"),
                    source,
                });
            }
        }

        let target = match &check.kind {
            CheckKind::Tcp {
                address,
                write_timeout_ms,
            } => {
                if Duration::from_millis(*write_timeout_ms).is_zero() {
                    errors.push(ValidationError::ZeroWriteTimeout {
                        name: name.to_string(),
                    });
                }
                TcpTarget::parse(address).map(|_| ())
            }
            CheckKind::Http {
                base_url,
                ready_path,
                expected_status,
                meta_path,
            } => HttpTarget::new(base_url, ready_path, *expected_status, meta_path.as_deref())
                .map(|_| ()),
        };
        if let Err(cause) = target {
            errors.push(ValidationError::Target {
                name: name.to_string(),
                cause,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
