//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::load_balancer::{
    error::{BalancerError, BalancerResult},
    unique_backends, SelectionPolicy,
};

/// Round-robin selector.
/// Stores an internal counter to rotate through backends.
#[derive(Debug)]
pub struct RoundRobin {
    backends: Vec<String>,
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new<I, S>(backends: I) -> BalancerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backends = unique_backends(backends);
        if backends.is_empty() {
            return Err(BalancerError::NoBackendsConfigured);
        }
        tracing::info!(backend_count = backends.len(), "Round robin policy initialized");
        Ok(Self {
            backends,
            counter: AtomicUsize::new(0),
        })
    }
}

impl SelectionPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn select_backend(&self) -> BalancerResult<String> {
        if self.backends.is_empty() {
            return Err(BalancerError::EmptyBackendSet);
        }
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % self.backends.len();
        let backend = self.backends[index].clone();
        tracing::debug!(backend = %backend, "Selected backend");
        Ok(backend)
    }

    /// Nothing is tracked, but releasing a backend this policy never handed
    /// out is still misuse.
    fn release_connection(&self, backend: &str) -> BalancerResult<()> {
        if self.backends.iter().any(|b| b == backend) {
            Ok(())
        } else {
            Err(BalancerError::UnknownBackend(backend.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new(["127.0.0.1:8080", "127.0.0.1:8081"]).unwrap();

        assert_eq!(lb.select_backend().unwrap(), "127.0.0.1:8080");
        assert_eq!(lb.select_backend().unwrap(), "127.0.0.1:8081");
        assert_eq!(lb.select_backend().unwrap(), "127.0.0.1:8080");
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            RoundRobin::new(Vec::<&str>::new()).unwrap_err(),
            BalancerError::NoBackendsConfigured
        );
    }

    #[test]
    fn test_release() {
        let lb = RoundRobin::new(["a"]).unwrap();
        assert!(lb.release_connection("a").is_ok());
        assert_eq!(lb.release_connection("b"), Err(BalancerError::UnknownBackend("b".into())));
        assert!(lb.loads().is_none());
    }
}
