//! Breaker state enumeration.
//!
//! # States
//! - Closed: calls pass through, failures are counted
//! - Open: calls are short-circuited, the protected operation is not invoked
//! - HalfOpen: one trial call is let through to probe for recovery
//!
//! The canonical names (`CLOSED`, `OPEN`, `HALF_OPEN`) are what diagnostics,
//! logs and the JSON snapshot expose.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Current state of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    /// Canonical upper-case name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "CLOSED",
            BreakerState::Open => "OPEN",
            BreakerState::HalfOpen => "HALF_OPEN",
        }
    }

    /// Numeric encoding used by the `circuit_breaker_state` gauge.
    pub fn gauge_value(&self) -> f64 {
        match self {
            BreakerState::Closed => 0.0,
            BreakerState::HalfOpen => 1.0,
            BreakerState::Open => 2.0,
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown breaker state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for BreakerState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CLOSED" => Ok(BreakerState::Closed),
            "OPEN" => Ok(BreakerState::Open),
            "HALF_OPEN" | "HALF-OPEN" => Ok(BreakerState::HalfOpen),
            _ => Err(UnknownState(s.to_string())),
        }
    }
}
