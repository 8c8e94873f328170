//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_selections_total` (counter): selections by policy, backend
//! - `balancer_selection_errors_total` (counter): failed selections by policy, reason
//! - `balancer_releases_total` (counter): released connections by backend
//! - `balancer_active_connections` (gauge): tracked connections per backend
//!
//! # Design Decisions
//! - Recorder is installed without an HTTP listener; callers render on demand
//! - Labels for policy, backend, and error reason

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Metrics recorder installed");
    Ok(handle)
}

/// Record a successful backend selection.
pub fn record_selection(policy: &'static str, backend: &str) {
    metrics::counter!(
        "balancer_selections_total",
        "policy" => policy,
        "backend" => backend.to_string()
    )
    .increment(1);
}

/// Record a failed backend selection.
pub fn record_selection_error(policy: &'static str, reason: &'static str) {
    metrics::counter!(
        "balancer_selection_errors_total",
        "policy" => policy,
        "reason" => reason
    )
    .increment(1);
}

/// Record a released connection.
pub fn record_release(backend: &str) {
    metrics::counter!("balancer_releases_total", "backend" => backend.to_string()).increment(1);
}

/// Publish the current connection count of a backend.
pub fn set_active_connections(backend: &str, count: u64) {
    metrics::gauge!("balancer_active_connections", "backend" => backend.to_string()).set(count as f64);
}
