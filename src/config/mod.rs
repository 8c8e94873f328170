//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → Balancer::from_config builds the selection policy
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the backend set is fixed for the
//!   lifetime of a policy
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{BackendConfig, BalancerConfig, ObservabilityConfig, PolicyKind};
pub use validation::{validate_config, ValidationError};
