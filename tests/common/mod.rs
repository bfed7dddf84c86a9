//! Shared fixtures for breaker integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use circuit_breaker::services::{RemoteService, RemoteServiceError};
use circuit_breaker::{CircuitBreaker, ManualClock};

/// Breaker driven by a manual clock the test controls.
pub fn manual_breaker(threshold: u32, retry_timeout: Duration) -> (Arc<CircuitBreaker>, ManualClock) {
    let clock = ManualClock::new();
    let breaker = CircuitBreaker::with_clock("test", threshold, retry_timeout, Arc::new(clock.clone()))
        .expect("valid breaker parameters");
    (Arc::new(breaker), clock)
}

/// Remote service spy that counts invocations and fails on demand.
#[derive(Debug, Default)]
pub struct CountingService {
    calls: AtomicU32,
    failing: AtomicBool,
}

impl CountingService {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let service = Self::default();
        service.failing.store(true, Ordering::SeqCst);
        Arc::new(service)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteService for CountingService {
    fn call(&self) -> Result<String, RemoteServiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            Err(RemoteServiceError::new(format!("call {n} failed")))
        } else {
            Ok(format!("call {n} ok"))
        }
    }
}
