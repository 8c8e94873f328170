//! Connection-aware backend selection.
//!
//! Picks which backend handles each unit of work. The least-connections
//! policy is backed by an indexed min-heap so the least-loaded backend is
//! found, and re-ranked, in O(log n).

pub mod config;
pub mod load_balancer;
pub mod observability;

pub use config::schema::BalancerConfig;
pub use load_balancer::{Balancer, BalancerError, ConnectionGuard, SelectionPolicy};
