//! Least Connections load balancing strategy.
//!
//! Counts live in a map; an [`IndexedPriorityQueue`] keyed by backend with the
//! same counts as priorities surfaces the least-loaded backend in O(log n).
//! Both sit behind one mutex so no caller ever sees them disagree.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::load_balancer::{
    error::{BalancerError, BalancerResult},
    priority_queue::IndexedPriorityQueue,
    unique_backends, BackendLoad, SelectionPolicy,
};
use crate::observability::metrics;

#[derive(Debug)]
struct ConnectionTable {
    /// backend -> active connections. Source of truth for counts.
    counts: HashMap<String, u64>,
    /// Same counts, ordered for fast minimum lookup.
    queue: IndexedPriorityQueue<String, u64>,
}

impl ConnectionTable {
    /// Pop, bump, reinsert. Returns the backend and its new count.
    ///
    /// Runs entirely under the caller's lock so two callers can never be
    /// handed the same unit of capacity.
    fn select(&mut self) -> BalancerResult<(String, u64)> {
        let backend = self.queue.pop()?;
        // A queued backend without a recorded count means the two structures
        // diverged; surface it rather than registering the backend here.
        let count = match self.counts.get_mut(&backend) {
            Some(count) => count,
            None => return Err(BalancerError::UnknownBackend(backend)),
        };
        *count += 1;
        let active = *count;
        self.queue.insert(backend.clone(), active);
        Ok((backend, active))
    }

    /// Decrement and re-rank. Returns the new count.
    fn release(&mut self, backend: &str) -> BalancerResult<u64> {
        let count = self
            .counts
            .get_mut(backend)
            .ok_or_else(|| BalancerError::UnknownBackend(backend.to_string()))?;
        if *count == 0 {
            return Err(BalancerError::NoActiveConnections(backend.to_string()));
        }
        *count -= 1;
        let active = *count;
        self.queue.update_priority(backend, active);
        Ok(active)
    }
}

/// Least connections selector.
/// Selects the backend with the minimum number of active connections.
#[derive(Debug)]
pub struct LeastConnections {
    table: Mutex<ConnectionTable>,
}

impl LeastConnections {
    /// Register every backend with zero active connections.
    ///
    /// Duplicate identifiers are registered once.
    pub fn new<I, S>(backends: I) -> BalancerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backends = unique_backends(backends);
        if backends.is_empty() {
            return Err(BalancerError::NoBackendsConfigured);
        }

        let counts: HashMap<String, u64> = backends.iter().map(|b| (b.clone(), 0)).collect();
        let queue: IndexedPriorityQueue<String, u64> = backends.into_iter().map(|b| (b, 0)).collect();

        for backend in counts.keys() {
            metrics::set_active_connections(backend, 0);
        }
        tracing::info!(backend_count = counts.len(), "Least connections policy initialized");

        Ok(Self {
            table: Mutex::new(ConnectionTable { counts, queue }),
        })
    }

    /// Active connections currently recorded for `backend`.
    pub fn connection_count(&self, backend: &str) -> BalancerResult<u64> {
        let table = self.table.lock().expect("least connections mutex poisoned");
        table
            .counts
            .get(backend)
            .copied()
            .ok_or_else(|| BalancerError::UnknownBackend(backend.to_string()))
    }

    #[cfg(test)]
    fn assert_in_lockstep(&self) {
        let table = self.table.lock().unwrap();
        assert_eq!(table.counts.len(), table.queue.len());
        for (backend, count) in &table.counts {
            assert_eq!(table.queue.priority(backend.as_str()), Some(count), "{} out of sync", backend);
        }
    }
}

impl SelectionPolicy for LeastConnections {
    fn name(&self) -> &'static str {
        "least_connections"
    }

    fn select_backend(&self) -> BalancerResult<String> {
        let selected = self.table.lock().expect("least connections mutex poisoned").select();
        let (backend, active) = selected?;

        tracing::debug!(backend = %backend, active_connections = active, "Selected backend");
        metrics::set_active_connections(&backend, active);
        Ok(backend)
    }

    fn release_connection(&self, backend: &str) -> BalancerResult<()> {
        let released = self.table.lock().expect("least connections mutex poisoned").release(backend);
        let active = match released {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!(backend = %backend, error = %e, "Rejected connection release");
                return Err(e);
            }
        };

        tracing::debug!(backend = %backend, active_connections = active, "Released connection");
        metrics::record_release(backend);
        metrics::set_active_connections(backend, active);
        Ok(())
    }

    fn loads(&self) -> Option<Vec<BackendLoad>> {
        let table = self.table.lock().expect("least connections mutex poisoned");
        let mut loads: Vec<BackendLoad> = table
            .counts
            .iter()
            .map(|(backend, &active_connections)| BackendLoad {
                backend: backend.clone(),
                active_connections,
            })
            .collect();
        loads.sort_by(|a, b| a.backend.cmp(&b.backend));
        Some(loads)
    }
}
