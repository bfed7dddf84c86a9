//! Circuit breaker guarding a single downstream dependency.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast with the cached failure
//! - Half-Open: one trial call probes whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold, retry timeout not yet elapsed
//! Open → Half-Open: more than retry_timeout since the last failure
//! Half-Open → Closed: trial call succeeds (record_success)
//! Half-Open → Open: trial call fails (record_failure restarts the timeout)
//! ```
//!
//! # Design Decisions
//! - Lazy evaluation: state is recomputed from (failure_count, last_failure, now)
//!   every time it is consulted; there is no background timer
//! - Bookkeeping is serialized under one mutex; the protected operation runs
//!   outside of it
//! - Single trial in Half-Open, tracked by an RAII permit that is released even
//!   if the call panics or its future is dropped
//! - Failures are always propagated to the caller, never retried

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::BreakerConfig;
use crate::observability::metrics;
use crate::resilience::clock::{Clock, SystemClock};
use crate::resilience::error::{BreakerError, InvalidConfig};
use crate::resilience::state::BreakerState;

/// When the most recent failure happened, as far as evaluation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastFailure {
    /// No recent failure; the retry window can never be considered elapsed.
    Never,
    At(Instant),
    /// Forced by an administrative override: the retry window is already spent.
    RetryElapsed,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    failure_count: u32,
    last_failure: LastFailure,
    last_failure_response: Option<String>,
    trial_in_flight: bool,
}

impl Inner {
    fn pristine() -> Self {
        Self {
            state: BreakerState::Closed,
            failure_count: 0,
            last_failure: LastFailure::Never,
            last_failure_response: None,
            trial_in_flight: false,
        }
    }
}

/// Point-in-time view of a breaker, for logs and dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: BreakerState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    pub retry_timeout_ms: u64,
    pub last_failure: Option<String>,
}

/// A lazily evaluated circuit breaker.
///
/// One instance guards one logical dependency. It is `Send + Sync`; share it
/// behind an `Arc` between the tasks that call that dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    retry_timeout: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a breaker driven by the system clock.
    ///
    /// Fails if `failure_threshold` is zero.
    pub fn new(
        name: impl Into<String>,
        failure_threshold: u32,
        retry_timeout: Duration,
    ) -> Result<Self, InvalidConfig> {
        Self::with_clock(name, failure_threshold, retry_timeout, Arc::new(SystemClock))
    }

    /// Create a breaker that reads time from `clock`.
    pub fn with_clock(
        name: impl Into<String>,
        failure_threshold: u32,
        retry_timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, InvalidConfig> {
        if failure_threshold == 0 {
            return Err(InvalidConfig::ZeroFailureThreshold);
        }

        let breaker = Self {
            name: name.into(),
            failure_threshold,
            retry_timeout,
            clock,
            inner: Mutex::new(Inner::pristine()),
        };

        tracing::debug!(
            breaker = %breaker.name,
            failure_threshold,
            retry_timeout_ms = millis(retry_timeout),
            "Circuit breaker created"
        );
        metrics::record_state(&breaker.name, BreakerState::Closed);
        Ok(breaker)
    }

    /// Build a breaker from its configuration entry.
    pub fn from_config(config: &BreakerConfig) -> Result<Self, InvalidConfig> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        config: &BreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, InvalidConfig> {
        Self::with_clock(
            config.name.clone(),
            config.failure_threshold,
            config.retry_timeout(),
            clock,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Failures required to trip the circuit.
    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Quiet period after the last failure before a trial call is allowed.
    pub fn retry_timeout(&self) -> Duration {
        self.retry_timeout
    }

    /// Consecutive failures since the last success or reset.
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    /// Detail of the most recent recorded failure.
    pub fn last_failure_response(&self) -> Option<String> {
        self.lock().last_failure_response.clone()
    }

    /// Evaluate and return the current state.
    pub fn state(&self) -> BreakerState {
        let mut inner = self.lock();
        self.evaluate(&mut inner)
    }

    /// Evaluate state and capture all bookkeeping at once.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let mut inner = self.lock();
        let state = self.evaluate(&mut inner);
        BreakerSnapshot {
            name: self.name.clone(),
            state,
            failure_count: inner.failure_count,
            failure_threshold: self.failure_threshold,
            retry_timeout_ms: millis(self.retry_timeout),
            last_failure: inner.last_failure_response.clone(),
        }
    }

    /// Reset all failure bookkeeping and close the circuit.
    pub fn record_success(&self) {
        self.settle_success(false);
    }

    /// Count a failure and cache its detail.
    ///
    /// State is not changed here; the next evaluation derives it.
    pub fn record_failure(&self, detail: impl Into<String>) {
        self.settle_failure(detail.into(), false);
    }

    /// Administrative override.
    ///
    /// Bypasses the normal invariants by rewriting the bookkeeping so that the
    /// next evaluation lands on `state`:
    /// - `Open`: threshold reached, last failure now (open until the timeout)
    /// - `HalfOpen`: threshold reached, retry window already spent (one trial)
    /// - `Closed`: failures cleared as if a call had just succeeded
    ///
    /// A trial already in flight keeps its slot until it settles.
    pub fn set_state(&self, state: BreakerState) {
        let mut inner = self.lock();
        let now = self.clock.now();
        match state {
            BreakerState::Open => {
                inner.failure_count = self.failure_threshold;
                inner.last_failure = LastFailure::At(now);
            }
            BreakerState::HalfOpen => {
                inner.failure_count = self.failure_threshold;
                inner.last_failure = LastFailure::RetryElapsed;
            }
            BreakerState::Closed => {
                inner.failure_count = 0;
                inner.last_failure = LastFailure::Never;
            }
        }

        tracing::warn!(breaker = %self.name, state = %state, "Circuit breaker state overridden");
        self.evaluate(&mut inner);
    }

    /// Run `op` through the breaker.
    ///
    /// While open (or while another trial is in flight in half-open) the call
    /// is refused with [`BreakerError::ShortCircuited`] and `op` is never
    /// invoked. Otherwise `op` runs exactly once; success closes the circuit,
    /// failure is recorded and handed back as [`BreakerError::Service`].
    pub fn attempt<T, E, F>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        let permit = self.admit().map_err(short_circuited::<E>)?;
        match op() {
            Ok(value) => {
                permit.succeeded();
                Ok(value)
            }
            Err(e) => {
                permit.failed(e.to_string());
                Err(BreakerError::Service(e))
            }
        }
    }

    /// Async counterpart of [`attempt`](Self::attempt).
    ///
    /// The bookkeeping lock is never held across the operation's `.await`.
    /// Dropping the returned future mid-call releases a half-open trial
    /// without recording an outcome.
    pub async fn attempt_async<T, E, F, Fut>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let permit = self.admit().map_err(short_circuited::<E>)?;
        match op().await {
            Ok(value) => {
                permit.succeeded();
                Ok(value)
            }
            Err(e) => {
                permit.failed(e.to_string());
                Err(BreakerError::Service(e))
            }
        }
    }

    /// Evaluate state and decide whether a call may proceed.
    ///
    /// On refusal returns the cached failure detail.
    fn admit(&self) -> Result<CallPermit<'_>, Option<String>> {
        let mut inner = self.lock();
        match self.evaluate(&mut inner) {
            BreakerState::Closed => Ok(CallPermit::new(self, false)),
            BreakerState::HalfOpen if !inner.trial_in_flight => {
                inner.trial_in_flight = true;
                tracing::info!(breaker = %self.name, "Admitting trial call");
                Ok(CallPermit::new(self, true))
            }
            state => {
                tracing::debug!(breaker = %self.name, state = %state, "Call short-circuited");
                metrics::record_call(&self.name, "short_circuited");
                Err(inner.last_failure_response.clone())
            }
        }
    }

    fn evaluate(&self, inner: &mut Inner) -> BreakerState {
        let next = if inner.failure_count < self.failure_threshold {
            BreakerState::Closed
        } else if self.retry_window_elapsed(inner.last_failure) {
            BreakerState::HalfOpen
        } else {
            BreakerState::Open
        };
        self.transition(inner, next);
        next
    }

    fn retry_window_elapsed(&self, last_failure: LastFailure) -> bool {
        match last_failure {
            LastFailure::Never => false,
            LastFailure::At(at) => {
                self.clock.now().saturating_duration_since(at) > self.retry_timeout
            }
            LastFailure::RetryElapsed => true,
        }
    }

    fn transition(&self, inner: &mut Inner, next: BreakerState) {
        let prev = inner.state;
        if prev == next {
            return;
        }
        inner.state = next;
        tracing::info!(breaker = %self.name, from = %prev, to = %next, "Circuit breaker state changed");
        metrics::record_transition(&self.name, prev, next);
    }

    /// Only the trial permit may free the half-open slot; outcomes of calls
    /// admitted while closed leave it alone.
    fn settle_success(&self, trial: bool) {
        let mut inner = self.lock();
        inner.failure_count = 0;
        inner.last_failure = LastFailure::Never;
        if trial {
            inner.trial_in_flight = false;
        }
        self.transition(&mut inner, BreakerState::Closed);
    }

    fn settle_failure(&self, detail: String, trial: bool) {
        let mut inner = self.lock();
        let now = self.clock.now();
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure = LastFailure::At(now);
        if trial {
            inner.trial_in_flight = false;
        }

        tracing::warn!(
            breaker = %self.name,
            failure_count = inner.failure_count,
            failure_threshold = self.failure_threshold,
            error = %detail,
            "Protected call failed"
        );
        inner.last_failure_response = Some(detail);
    }

    fn release_trial(&self) {
        self.lock().trial_in_flight = false;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The protected operation never runs under this lock, so a poisoned
        // guard still holds consistent bookkeeping.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn short_circuited<E>(last_failure: Option<String>) -> BreakerError<E> {
    BreakerError::ShortCircuited { last_failure }
}

/// Admission ticket for one call through the breaker.
///
/// A trial permit that is dropped without an outcome (panic, cancelled
/// future) frees the half-open slot for the next caller.
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self {
            breaker,
            trial,
            settled: false,
        }
    }

    fn succeeded(mut self) {
        self.settled = true;
        metrics::record_call(&self.breaker.name, "success");
        self.breaker.settle_success(self.trial);
    }

    fn failed(mut self, detail: String) {
        self.settled = true;
        metrics::record_call(&self.breaker.name, "failure");
        self.breaker.settle_failure(detail, self.trial);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.trial && !self.settled {
            tracing::debug!(breaker = %self.breaker.name, "Trial call abandoned");
            self.breaker.release_trial();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::clock::ManualClock;

    fn breaker(threshold: u32, retry: Duration) -> (CircuitBreaker, ManualClock) {
        let clock = ManualClock::new();
        let cb = CircuitBreaker::with_clock("test", threshold, retry, Arc::new(clock.clone()))
            .unwrap();
        (cb, clock)
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = CircuitBreaker::new("bad", 0, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err, InvalidConfig::ZeroFailureThreshold);
    }

    #[test]
    fn test_pristine_breaker_is_closed() {
        let (cb, _) = breaker(3, Duration::from_secs(1));
        assert_eq!(cb.state(), BreakerState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.last_failure_response(), None);
    }

    #[test]
    fn test_failures_below_threshold_stay_closed() {
        let (cb, _) = breaker(3, Duration::from_secs(1));
        cb.record_failure("one");
        cb.record_failure("two");
        assert_eq!(cb.state(), BreakerState::Closed);
        assert_eq!(cb.failure_count(), 2);
    }

    #[test]
    fn test_retry_timeout_boundary_is_exclusive() {
        let (cb, clock) = breaker(1, Duration::from_millis(100));
        cb.record_failure("down");

        clock.advance(Duration::from_millis(100));
        assert_eq!(cb.state(), BreakerState::Open);

        clock.advance(Duration::from_nanos(1));
        assert_eq!(cb.state(), BreakerState::HalfOpen);
    }

    #[test]
    fn test_trial_permit_released_when_abandoned() {
        let (cb, _) = breaker(1, Duration::from_secs(1));
        cb.set_state(BreakerState::HalfOpen);

        let permit = cb.admit().unwrap();
        assert!(cb.admit().is_err(), "second trial must be refused");
        drop(permit);

        assert!(cb.admit().is_ok());
    }

    #[test]
    fn test_snapshot_reflects_bookkeeping() {
        let (cb, _) = breaker(2, Duration::from_millis(1500));
        cb.record_failure("timeout");
        cb.record_failure("refused");

        let snap = cb.snapshot();
        assert_eq!(snap.state, BreakerState::Open);
        assert_eq!(snap.failure_count, 2);
        assert_eq!(snap.retry_timeout_ms, 1500);
        assert_eq!(snap.last_failure.as_deref(), Some("refused"));
    }

    #[test]
    fn test_snapshot_saturates_huge_retry_timeout() {
        let (cb, _) = breaker(1, Duration::MAX);
        assert_eq!(cb.snapshot().retry_timeout_ms, u64::MAX);
    }
}
