//! Metrics collection and exposition.
//!
//! # Metrics
//! - `circuit_breaker_calls_total` (counter): calls by breaker, outcome
//!   (`success`, `failure`, `short_circuited`)
//! - `circuit_breaker_transitions_total` (counter): state changes by breaker, from, to
//! - `circuit_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//!
//! # Design Decisions
//! - Uses the `metrics` facade; without a recorder every call is a no-op
//! - Prometheus exporter is opt-in via `init_metrics`

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::resilience::BreakerState;

/// Install the Prometheus recorder and its HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!(
        "circuit_breaker_calls_total",
        "Calls routed through a circuit breaker, by outcome"
    );
    metrics::describe_counter!(
        "circuit_breaker_transitions_total",
        "Circuit breaker state transitions"
    );
    metrics::describe_gauge!(
        "circuit_breaker_state",
        "Current breaker state (0=closed, 1=half-open, 2=open)"
    );

    tracing::info!(address = %addr, "Prometheus metrics endpoint started");
    Ok(())
}

pub fn record_call(breaker: &str, outcome: &'static str) {
    metrics::counter!(
        "circuit_breaker_calls_total",
        "breaker" => breaker.to_owned(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_transition(breaker: &str, from: BreakerState, to: BreakerState) {
    metrics::counter!(
        "circuit_breaker_transitions_total",
        "breaker" => breaker.to_owned(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    record_state(breaker, to);
}

pub fn record_state(breaker: &str, state: BreakerState) {
    metrics::gauge!("circuit_breaker_state", "breaker" => breaker.to_owned()).set(state.gauge_value());
}
