//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Policies and the balancer facade produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stdout (tracing fmt layer)
//!     → Prometheus text exposition rendered on demand
//! ```
//!
//! # Design Decisions
//! - Structured fields (`backend`, `active_connections`) on every selection event
//! - Metric updates are no-ops until a recorder is installed
//! - Log level configurable via config and `RUST_LOG`

pub mod logging;
pub mod metrics;
