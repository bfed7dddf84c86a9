//! Lazily evaluated, thread-safe circuit breaker.
//!
//! A [`CircuitBreaker`] guards calls to one downstream dependency. It counts
//! consecutive failures, trips open once they reach a threshold, short-circuits
//! calls with the last real failure while open, and lets a single trial call
//! through once the retry timeout has elapsed.

pub mod config;
pub mod observability;
pub mod resilience;
pub mod services;

pub use config::AppConfig;
pub use resilience::{
    BreakerError, BreakerRegistry, BreakerSnapshot, BreakerState, CircuitBreaker, Clock,
    ManualClock, SystemClock,
};
