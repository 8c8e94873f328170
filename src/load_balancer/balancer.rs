//! Balancer facade and connection guards.
//!
//! # Responsibilities
//! - Build the configured selection policy
//! - Forward selections and releases to it
//! - Hand out guards that release their connection on drop

use std::ops::Deref;
use std::sync::Arc;

use crate::config::{BalancerConfig, PolicyKind};
use crate::load_balancer::{
    error::BalancerResult, BackendLoad, LeastConnections, RoundRobin, SelectionPolicy,
};
use crate::observability::metrics;

/// Forwards selection requests to one policy.
///
/// Holds no lock of its own; the policy is responsible for being safe under
/// concurrent use.
#[derive(Debug, Clone)]
pub struct Balancer {
    policy: Arc<dyn SelectionPolicy>,
}

impl Balancer {
    /// Build a balancer over `backends` using the given policy kind.
    pub fn new<I, S>(backends: I, kind: PolicyKind) -> BalancerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let policy: Arc<dyn SelectionPolicy> = match kind {
            PolicyKind::LeastConnections => Arc::new(LeastConnections::new(backends)?),
            PolicyKind::RoundRobin => Arc::new(RoundRobin::new(backends)?),
        };
        Ok(Self::with_policy(policy))
    }

    pub fn from_config(config: &BalancerConfig) -> BalancerResult<Self> {
        Self::new(config.backend_addresses(), config.policy)
    }

    /// Wrap an already-built policy.
    pub fn with_policy(policy: Arc<dyn SelectionPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Select a backend for the next unit of work.
    ///
    /// The caller owns the matching [`release_connection`](Self::release_connection).
    /// Prefer [`acquire`](Self::acquire) when the release should be automatic.
    pub fn select_backend(&self) -> BalancerResult<String> {
        match self.policy.select_backend() {
            Ok(backend) => {
                metrics::record_selection(self.policy.name(), &backend);
                Ok(backend)
            }
            Err(e) => {
                tracing::warn!(policy = self.policy.name(), error = %e, "Backend selection failed");
                metrics::record_selection_error(self.policy.name(), e.reason());
                Err(e)
            }
        }
    }

    /// Report that a unit of work on `backend` finished.
    pub fn release_connection(&self, backend: &str) -> BalancerResult<()> {
        self.policy.release_connection(backend)
    }

    /// Select a backend and return a guard that releases it on drop.
    pub fn acquire(&self) -> BalancerResult<ConnectionGuard> {
        let backend = self.select_backend()?;
        Ok(ConnectionGuard {
            backend,
            policy: Some(self.policy.clone()),
        })
    }

    /// Per-backend connection counts, if the policy tracks them.
    pub fn active_connections(&self) -> Option<Vec<BackendLoad>> {
        self.policy.loads()
    }
}

/// A RAII guard for one selected connection.
#[derive(Debug)]
pub struct ConnectionGuard {
    backend: String,
    /// Taken once the connection has been released.
    policy: Option<Arc<dyn SelectionPolicy>>,
}

impl ConnectionGuard {
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Release now and surface any error instead of logging it on drop.
    pub fn release(mut self) -> BalancerResult<()> {
        match self.policy.take() {
            Some(policy) => policy.release_connection(&self.backend),
            None => Ok(()),
        }
    }
}

impl Deref for ConnectionGuard {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some(policy) = self.policy.take() {
            if let Err(e) = policy.release_connection(&self.backend) {
                tracing::warn!(backend = %self.backend, error = %e, "Failed to release connection on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::load_balancer::BalancerError;

    fn count_of(balancer: &Balancer, backend: &str) -> u64 {
        balancer
            .active_connections()
            .unwrap()
            .into_iter()
            .find(|l| l.backend == backend)
            .map(|l| l.active_connections)
            .unwrap()
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let balancer = Balancer::new(["a", "b"], PolicyKind::LeastConnections).unwrap();

        let guard = balancer.acquire().unwrap();
        let backend = guard.backend().to_string();
        assert_eq!(count_of(&balancer, &backend), 1);

        drop(guard);
        assert_eq!(count_of(&balancer, &backend), 0);
    }

    #[test]
    fn test_explicit_release_happens_once() {
        let balancer = Balancer::new(["a"], PolicyKind::LeastConnections).unwrap();

        let guard = balancer.acquire().unwrap();
        assert_eq!(&*guard, "a");
        guard.release().unwrap();
        assert_eq!(count_of(&balancer, "a"), 0);

        // Guard consumed; a further manual release is an underflow.
        assert_eq!(
            balancer.release_connection("a"),
            Err(BalancerError::NoActiveConnections("a".into()))
        );
    }

    #[test]
    fn test_policy_selection() {
        let lc = Balancer::new(["a"], PolicyKind::LeastConnections).unwrap();
        assert_eq!(lc.policy_name(), "least_connections");

        let rr = Balancer::new(["a"], PolicyKind::RoundRobin).unwrap();
        assert_eq!(rr.policy_name(), "round_robin");
        assert!(rr.active_connections().is_none());
    }

    #[test]
    fn test_from_config() {
        let mut config = BalancerConfig::default();
        config.policy = PolicyKind::RoundRobin;
        config.backends.push(BackendConfig { address: "10.0.0.1:80".into() });
        config.backends.push(BackendConfig { address: "10.0.0.2:80".into() });

        let balancer = Balancer::from_config(&config).unwrap();
        assert_eq!(balancer.select_backend().unwrap(), "10.0.0.1:80");
        assert_eq!(balancer.select_backend().unwrap(), "10.0.0.2:80");
    }

    #[test]
    fn test_empty_config_rejected() {
        let config = BalancerConfig::default();
        assert_eq!(
            Balancer::from_config(&config).unwrap_err(),
            BalancerError::NoBackendsConfigured
        );
    }
}
