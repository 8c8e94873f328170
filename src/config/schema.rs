//! Configuration schema definitions.
//!
//! ```toml
//! policy = "least_connections"
//!
//! [[backends]]
//! address = "localhost:8081"
//!
//! [[backends]]
//! address = "localhost:8082"
//!
//! [observability]
//! log_filter = "conn_balancer=debug"
//! metrics_enabled = true
//! ```

use serde::{Deserialize, Serialize};

/// Root configuration for the balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Selection policy applied to every request.
    pub policy: PolicyKind,

    /// Backend server definitions.
    pub backends: Vec<BackendConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl BalancerConfig {
    /// Backend identifiers in declaration order.
    ///
    /// Surrounding whitespace is stripped, matching what validation checks.
    pub fn backend_addresses(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.address.trim().to_string()).collect()
    }
}

/// Which selection policy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Fewest active connections first.
    #[default]
    LeastConnections,
    /// Rotate through backends in order.
    RoundRobin,
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BackendConfig {
    /// Backend address (e.g., "127.0.0.1:3000"). Doubles as its identifier.
    pub address: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter, overridden by `RUST_LOG`.
    pub log_filter: String,

    /// Install the Prometheus recorder.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "conn_balancer=info".to_string(),
            metrics_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validate_config;

    #[test]
    fn test_backend_addresses_are_trimmed() {
        let config = BalancerConfig {
            backends: vec![
                BackendConfig { address: " a:1".into() },
                BackendConfig { address: "b:2 \t".into() },
            ],
            ..Default::default()
        };

        assert!(validate_config(&config).is_ok());
        assert_eq!(config.backend_addresses(), vec!["a:1", "b:2"]);
    }

    #[test]
    fn test_padded_duplicates_agree_with_validation() {
        let config = BalancerConfig {
            backends: vec![
                BackendConfig { address: "a:1".into() },
                BackendConfig { address: "a:1 ".into() },
            ],
            ..Default::default()
        };

        // Validation calls these the same backend, and so does the policy.
        assert!(validate_config(&config).is_err());
        assert_eq!(config.backend_addresses(), vec!["a:1", "a:1"]);
    }
}
