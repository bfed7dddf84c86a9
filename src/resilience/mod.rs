//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to a protected dependency:
//!     → registry.rs (look up the breaker owned by that dependency)
//!     → circuit_breaker.rs (evaluate state; admit, trial or short-circuit)
//!     → protected operation (outside the breaker lock)
//!     → circuit_breaker.rs (record success or failure)
//!     → caller receives the value, the real error, or the cached stale error
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency, never shared across unrelated ones
//! - No background timers; time comes from an injectable clock.rs
//! - Breakers never retry and never hide a real failure from the caller

pub mod circuit_breaker;
pub mod clock;
pub mod error;
pub mod registry;
pub mod state;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BreakerError, InvalidConfig};
pub use registry::BreakerRegistry;
pub use state::BreakerState;
