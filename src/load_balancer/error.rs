//! Load balancing error definitions.

use thiserror::Error;

/// Errors raised by [`IndexedPriorityQueue`](super::priority_queue::IndexedPriorityQueue).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Pop was called on a queue with no entries.
    #[error("priority queue is empty")]
    EmptyQueue,
}

/// Errors that can occur while selecting or releasing backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalancerError {
    /// A policy was constructed with an empty backend set.
    #[error("no backends configured")]
    NoBackendsConfigured,

    /// Selection found no candidate backends.
    #[error("backend set is empty")]
    EmptyBackendSet,

    /// A release named a backend the policy never registered.
    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    /// A release was reported for a backend with zero active connections.
    #[error("backend {0} has no active connections to release")]
    NoActiveConnections(String),
}

impl BalancerError {
    /// Short label used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            BalancerError::NoBackendsConfigured => "no_backends_configured",
            BalancerError::EmptyBackendSet => "empty_backend_set",
            BalancerError::UnknownBackend(_) => "unknown_backend",
            BalancerError::NoActiveConnections(_) => "no_active_connections",
        }
    }
}

impl From<QueueError> for BalancerError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::EmptyQueue => BalancerError::EmptyBackendSet,
        }
    }
}

/// Result type for load balancing operations.
pub type BalancerResult<T> = Result<T, BalancerError>;
