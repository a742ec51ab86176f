//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! suite file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → SuiteConfig (validated, immutable)
//!     → one RetryPolicy + one probe per check
//! ```
//!
//! # Design Decisions
//! - Config is read once per process; there is no reload
//! - All policy fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{CheckConfig, CheckKind, PolicyConfig, PolicyOverride, SuiteConfig};
pub use validation::ValidationError;
