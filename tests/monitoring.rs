//! Monitoring service over a delayed and a quick remote service.
//!
//! Both remote services are guarded with a failure threshold of one and a
//! retry timeout of two seconds; the delayed service is down for the first
//! four seconds.

use std::sync::Arc;
use std::time::Duration;

use circuit_breaker::services::MonitoringService;
use circuit_breaker::{AppConfig, BreakerRegistry, BreakerState, ManualClock};

fn setup() -> (MonitoringService, BreakerRegistry, ManualClock) {
    let config = AppConfig::default();
    let clock = ManualClock::new();
    let registry = BreakerRegistry::from_configs(&config.breakers, Arc::new(clock.clone())).unwrap();
    let monitor = MonitoringService::from_config(&config, &registry, Arc::new(clock.clone())).unwrap();
    (monitor, registry, clock)
}

#[test]
fn test_local_resource_is_unguarded() {
    let (monitor, _, _) = setup();
    assert_eq!(monitor.local_resource_response(), "Local Service is working");
}

#[test]
fn test_failure_open_state_transition() {
    let (monitor, _, _) = setup();
    let delayed = monitor.delayed().breaker();

    assert_eq!(monitor.delayed_service_response(), "Delayed service is down");
    assert_eq!(delayed.state().to_string(), "OPEN");

    // Served from the breaker's cache, not the service.
    assert_eq!(monitor.delayed_service_response(), "Delayed service is down");
    assert_eq!(delayed.failure_count(), 1);

    assert_eq!(monitor.quick_service_response(), "Quick Service is working");
    assert_eq!(monitor.quick().breaker().state().to_string(), "CLOSED");
}

#[test]
fn test_failure_half_open_state_transition() {
    let (monitor, _, clock) = setup();

    assert_eq!(monitor.delayed_service_response(), "Delayed service is down");
    assert_eq!(monitor.delayed().breaker().state(), BreakerState::Open);

    clock.advance(Duration::from_millis(2001));
    assert_eq!(monitor.delayed().breaker().state().to_string(), "HALF_OPEN");
}

#[test]
fn test_recovery_closed_state_transition() {
    let (monitor, _, clock) = setup();

    assert_eq!(monitor.delayed_service_response(), "Delayed service is down");
    assert_eq!(monitor.delayed().breaker().state(), BreakerState::Open);

    clock.advance(Duration::from_millis(4001));
    assert_eq!(monitor.delayed().breaker().state(), BreakerState::HalfOpen);

    assert_eq!(monitor.delayed_service_response(), "Delayed service is working");
    assert_eq!(monitor.delayed().breaker().state().to_string(), "CLOSED");
    assert_eq!(monitor.delayed().breaker().failure_count(), 0);
}

#[test]
fn test_trial_against_still_down_service_reopens() {
    let (monitor, _, clock) = setup();
    monitor.delayed_service_response();

    clock.advance(Duration::from_millis(2001));
    assert_eq!(monitor.delayed_service_response(), "Delayed service is down");
    assert_eq!(monitor.delayed().breaker().state(), BreakerState::Open);
    assert_eq!(monitor.delayed().breaker().failure_count(), 2);

    clock.advance(Duration::from_millis(2001));
    assert_eq!(monitor.delayed_service_response(), "Delayed service is working");
    assert_eq!(monitor.delayed().breaker().state(), BreakerState::Closed);
}

#[test]
fn test_registry_snapshot_after_trip() {
    let (monitor, registry, _) = setup();
    monitor.delayed_service_response();
    monitor.quick_service_response();

    let snapshots = registry.snapshots();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].name, "delayed-service");
    assert_eq!(snapshots[0].state, BreakerState::Open);
    assert_eq!(snapshots[0].last_failure.as_deref(), Some("Delayed service is down"));
    assert_eq!(snapshots[1].name, "quick-service");
    assert_eq!(snapshots[1].state, BreakerState::Closed);
}

#[test]
fn test_operator_override_opens_quick_service() {
    let (monitor, _, _) = setup();
    monitor.quick().breaker().set_state(BreakerState::Open);

    assert_eq!(monitor.quick_service_response(), "circuit open");
    monitor.quick().breaker().set_state(BreakerState::Closed);
    assert_eq!(monitor.quick_service_response(), "Quick Service is working");
}
