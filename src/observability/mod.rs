//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breakers produce:
//!     → logging.rs (structured log events: transitions, failures, overrides)
//!     → metrics.rs (call outcomes, transitions, current state gauge)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Breaker name labels every event and series
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
