//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Caller asks for a backend
//!     → balancer.rs (facade, forwards to the configured policy)
//!     → Apply selection policy:
//!         - round_robin.rs (rotate through backends)
//!         - least_conn.rs (pop fewest-connections backend from
//!           priority_queue.rs, bump its count, reinsert)
//!     → Return backend identifier or BalancerError
//!
//! Unit of work finishes
//!     → ConnectionGuard dropped (or release_connection called)
//!     → least_conn.rs decrements count and re-ranks the backend
//! ```
//!
//! # Design Decisions
//! - Each policy owns its own synchronization; the facade adds no outer lock
//! - Counts and queue priorities are guarded together by one mutex
//! - Failures are typed errors, never sentinel backend strings

pub mod balancer;
pub mod error;
pub mod least_conn;
pub mod priority_queue;
pub mod round_robin;

use std::fmt::Debug;

use serde::Serialize;

pub use balancer::{Balancer, ConnectionGuard};
pub use error::{BalancerError, BalancerResult, QueueError};
pub use least_conn::LeastConnections;
pub use priority_queue::IndexedPriorityQueue;
pub use round_robin::RoundRobin;

/// Point-in-time connection count of one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendLoad {
    pub backend: String,
    pub active_connections: u64,
}

/// A pluggable algorithm deciding which backend receives the next unit of work.
///
/// Implementations must be safe to call from many threads at once.
pub trait SelectionPolicy: Send + Sync + Debug {
    /// Policy name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Pick the backend for the next unit of work.
    fn select_backend(&self) -> BalancerResult<String>;

    /// Report that a unit of work on `backend` finished.
    ///
    /// Policies that do not track load accept the call without doing anything.
    fn release_connection(&self, _backend: &str) -> BalancerResult<()> {
        Ok(())
    }

    /// Per-backend connection counts, for policies that track them.
    fn loads(&self) -> Option<Vec<BackendLoad>> {
        None
    }
}

/// Deduplicate backend identifiers, keeping first-seen order.
pub(crate) fn unique_backends<I, S>(backends: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = std::collections::HashSet::new();
    backends
        .into_iter()
        .map(Into::into)
        .filter(|b| seen.insert(b.clone()))
        .collect()
}
