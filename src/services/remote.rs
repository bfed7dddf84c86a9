//! Remote services guarded by a circuit breaker.
//!
//! # Responsibilities
//! - Define the contract a protected operation must satisfy
//! - Provide a healthy service and a service that recovers after a delay
//! - Pair a service with its breaker behind a zero-argument call

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::resilience::{BreakerError, CircuitBreaker, Clock, SystemClock};

/// Failure raised by a remote service, carrying a human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RemoteServiceError(pub String);

impl RemoteServiceError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// A dependency whose calls may fail.
///
/// The breaker never interprets the payload; it only distinguishes `Ok`
/// from `Err`.
pub trait RemoteService: Send + Sync {
    fn call(&self) -> Result<String, RemoteServiceError>;
}

impl<S: RemoteService + ?Sized> RemoteService for Arc<S> {
    fn call(&self) -> Result<String, RemoteServiceError> {
        (**self).call()
    }
}

/// A service that always answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickRemoteService;

impl RemoteService for QuickRemoteService {
    fn call(&self) -> Result<String, RemoteServiceError> {
        Ok("Quick Service is working".to_string())
    }
}

/// A service that is down for a fixed period after it starts.
#[derive(Debug, Clone)]
pub struct DelayedRemoteService {
    started_at: Instant,
    startup_delay: Duration,
    clock: Arc<dyn Clock>,
}

impl DelayedRemoteService {
    /// Service that started now, measured by the system clock.
    pub fn new(startup_delay: Duration) -> Self {
        Self::with_clock(startup_delay, Arc::new(SystemClock))
    }

    /// Service that started at the clock's current instant.
    pub fn with_clock(startup_delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            started_at: clock.now(),
            startup_delay,
            clock,
        }
    }

    pub fn is_up(&self) -> bool {
        self.clock.now().saturating_duration_since(self.started_at) > self.startup_delay
    }
}

impl RemoteService for DelayedRemoteService {
    fn call(&self) -> Result<String, RemoteServiceError> {
        if self.is_up() {
            Ok("Delayed service is working".to_string())
        } else {
            Err(RemoteServiceError::new("Delayed service is down"))
        }
    }
}

/// A remote service together with the breaker that owns it.
#[derive(Debug)]
pub struct ProtectedService<S> {
    service: S,
    breaker: Arc<CircuitBreaker>,
}

impl<S: RemoteService> ProtectedService<S> {
    pub fn new(service: S, breaker: Arc<CircuitBreaker>) -> Self {
        Self { service, breaker }
    }

    /// Call the service through the breaker.
    pub fn attempt_request(&self) -> Result<String, BreakerError<RemoteServiceError>> {
        self.breaker.attempt(|| self.service.call())
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}
