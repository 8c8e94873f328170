//! Connection balancer demo.
//!
//! Routes a batch of simulated units of work across a fixed backend set and
//! reports where each one went.
//!
//! ```text
//!   config file ─┐
//!   --backend ───┼─▶ BalancerConfig ─▶ Balancer ─▶ SelectionPolicy
//!   --policy ────┘                        │            ├─ least_connections
//!                                         │            └─ round_robin
//!                                         ▼
//!                               ConnectionGuard per request
//!                               (released once --hold is exceeded)
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

use clap::Parser;
use conn_balancer::config::{load_config, validate_config, BackendConfig, BalancerConfig, ConfigError, PolicyKind};
use conn_balancer::observability::{logging, metrics};
use conn_balancer::Balancer;

#[derive(Parser)]
#[command(name = "conn-balancer")]
#[command(about = "Distribute units of work across backends", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend address; repeat for several. Replaces backends from the config file.
    #[arg(short, long = "backend")]
    backends: Vec<String>,

    /// Selection policy, overriding the config file
    #[arg(short, long, value_enum)]
    policy: Option<PolicyKind>,

    /// Units of work to route (default: twice the backend count)
    #[arg(short = 'n', long)]
    requests: Option<usize>,

    /// Connections kept open at once; the oldest is released beyond this.
    /// Unset keeps every connection open until exit.
    #[arg(long)]
    hold: Option<usize>,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    metrics: bool,
}

fn build_config(cli: &Cli) -> Result<BalancerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BalancerConfig::default(),
    };

    if !cli.backends.is_empty() {
        config.backends = cli
            .backends
            .iter()
            .map(|address| BackendConfig { address: address.clone() })
            .collect();
    }
    if let Some(policy) = cli.policy {
        config.policy = policy;
    }
    if cli.metrics {
        config.observability.metrics_enabled = true;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    logging::init_logging(&config.observability.log_filter);
    tracing::info!(
        policy = ?config.policy,
        backends = config.backends.len(),
        "conn-balancer v0.1.0 starting"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    let balancer = Balancer::from_config(&config)?;
    let requests = cli.requests.unwrap_or(config.backends.len() * 2);

    let mut in_flight = VecDeque::new();
    let mut tally: BTreeMap<String, u64> = BTreeMap::new();

    for _ in 0..requests {
        let guard = balancer.acquire()?;
        println!("Redirecting to backend: {}", guard.backend());
        *tally.entry(guard.backend().to_string()).or_default() += 1;
        in_flight.push_back(guard);

        if let Some(hold) = cli.hold {
            while in_flight.len() > hold {
                if let Some(oldest) = in_flight.pop_front() {
                    oldest.release()?;
                }
            }
        }
    }

    let summary = serde_json::json!({
        "policy": balancer.policy_name(),
        "requests": requests,
        "selections": tally,
        "active_connections": balancer.active_connections(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(handle) = metrics_handle {
        println!("{}", handle.render());
    }

    drop(in_flight);
    tracing::info!("Shutdown complete");
    Ok(())
}
