//! Circuit breaker monitoring demo.
//!
//! Polls a local resource, a remote service that stays down for a while after
//! start, and a healthy remote service. Both remote services sit behind their
//! own breaker, so the log shows the delayed service's breaker trip open,
//! short-circuit with the cached failure, move to half-open after the retry
//! timeout and close again once the service answers.
//!
//! ```text
//! round ─▶ MonitoringService ─┬─▶ local resource
//!                             ├─▶ breaker ─▶ DelayedRemoteService
//!                             └─▶ breaker ─▶ QuickRemoteService
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use circuit_breaker::config::{load_config, validate_config, AppConfig, ConfigError};
use circuit_breaker::observability::{logging, metrics};
use circuit_breaker::services::MonitoringService;
use circuit_breaker::{BreakerRegistry, Clock, SystemClock};

#[derive(Parser)]
#[command(name = "circuit-breaker")]
#[command(about = "Circuit breaker monitoring demo", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of polling rounds
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Log output format
    #[arg(long, value_parser = ["pretty", "json"])]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(iterations) = cli.iterations {
        config.demo.iterations = iterations;
    }
    if let Some(format) = cli.log_format {
        config.observability.log_format = format;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;

    tracing::info!(
        breakers = config.breakers.len(),
        iterations = config.demo.iterations,
        interval_ms = config.demo.interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let registry = BreakerRegistry::from_configs(&config.breakers, clock.clone())?;
    let monitor = MonitoringService::from_config(&config, &registry, clock)?;

    let mut ticker = tokio::time::interval(Duration::from_millis(config.demo.interval_ms));
    for round in 1..=config.demo.iterations {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping monitor");
                break;
            }
        }

        let local = monitor.local_resource_response();
        let delayed = monitor.delayed_service_response();
        let quick = monitor.quick_service_response();
        tracing::info!(
            round,
            local = %local,
            delayed = %delayed,
            delayed_state = %monitor.delayed().breaker().state(),
            quick = %quick,
            quick_state = %monitor.quick().breaker().state(),
            "Monitoring round"
        );
    }

    println!("{}", serde_json::to_string_pretty(&registry.snapshots())?);
    Ok(())
}
